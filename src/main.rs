#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    intern_letters_server::run().await
}

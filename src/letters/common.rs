//! Common utilities for letter generation.
//!
//! Shared helpers for template rendering, date formatting, and file naming.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use super::{LetterError, LetterKind};

/// Format a date as `dd/mm/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Capitalize the first letter of each word and lowercase the rest.
pub fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape special characters for Typst strings.
pub fn escape_typst_string(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\n', r"\n")
}

/// Lowercase ASCII words of `name` joined by single dashes.
fn slug_words(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Download name for a letter, e.g. `ravi-kumar-experience-letter.pdf`.
pub fn output_filename(subject: &str, kind: LetterKind) -> String {
    let stem = slug_words(subject);
    let stem = if stem.is_empty() { "intern" } else { stem.as_str() };
    format!("{}-{}.pdf", stem, kind.slug())
}

/// Typst templates ship in `static/` next to the manifest.
pub fn template_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}

pub fn load_template(kind: LetterKind) -> Result<String, LetterError> {
    fs::read_to_string(template_dir().join(kind.template_file())).map_err(LetterError::TemplateIo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();
        assert_eq!(format_date(date), "05/04/2024");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("rAVI kumar"), "Ravi Kumar");
        assert_eq!(title_case("ANITHA"), "Anitha");
        assert_eq!(title_case("a  b"), "A  B");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_escape_typst_string() {
        assert_eq!(escape_typst_string(r#"O"Neil \ 2"#), r#"O\"Neil \\ 2"#);
        assert_eq!(escape_typst_string("a\nb"), r"a\nb");
    }

    #[test]
    fn test_output_filename() {
        assert_eq!(
            output_filename("Ravi  Kumar", LetterKind::ExperienceLetter),
            "ravi-kumar-experience-letter.pdf"
        );
        assert_eq!(
            output_filename("K. Sai-Teja", LetterKind::OfferLetter),
            "k-sai-teja-offer-letter.pdf"
        );
        assert_eq!(output_filename("!!!", LetterKind::OfferLetter), "intern-offer-letter.pdf");
    }

    #[test]
    fn test_templates_exist() {
        assert!(load_template(LetterKind::ExperienceLetter).is_ok());
        assert!(load_template(LetterKind::OfferLetter).is_ok());
    }
}

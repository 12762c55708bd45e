//! Generator for the offer letter, available from the day an intern is accepted.

use super::common::{escape_typst_string, format_date, load_template};
use super::traits::Generator;
use super::{LetterError, LetterKind, LetterLayout};
use crate::certificate::model::InternshipRecord;

const INTERNSHIP_DURATION: &str = "3 months";

pub struct OfferLetterGenerator {
    template: String,
    company: String,
}

impl OfferLetterGenerator {
    pub fn new(company: impl Into<String>) -> Result<Self, LetterError> {
        Ok(Self {
            template: load_template(LetterKind::OfferLetter)?,
            company: company.into(),
        })
    }
}

impl Generator<InternshipRecord> for OfferLetterGenerator {
    fn assemble(&self, intern: &InternshipRecord) -> Result<LetterLayout, LetterError> {
        let accepted = intern
            .date_accepted
            .ok_or(LetterError::MissingField("acceptance date"))?;
        let name = intern.full_name.trim();
        if name.is_empty() {
            return Err(LetterError::MissingField("full name"));
        }

        let source = format!(
            r#"{}

#offer_letter((
  company: "{}",
  issued_on: "{}",
  name: "{}",
  domain: "{}",
  duration: "{}",
))
"#,
            self.template,
            escape_typst_string(&self.company),
            format_date(accepted),
            escape_typst_string(name),
            escape_typst_string(&intern.domain),
            INTERNSHIP_DURATION,
        );

        Ok(LetterLayout {
            kind: LetterKind::OfferLetter,
            subject: name.to_string(),
            source,
        })
    }
}

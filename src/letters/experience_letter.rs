//! Generator for the experience letter issued when an internship ends.

use super::common::{escape_typst_string, format_date, load_template, title_case};
use super::traits::Generator;
use super::{LetterError, LetterKind, LetterLayout};
use crate::certificate::model::CertificateRecord;
use chrono::NaiveDate;

pub struct ExperienceLetterGenerator {
    template: String,
    company: String,
}

impl ExperienceLetterGenerator {
    /// Create a new generator instance.
    pub fn new(company: impl Into<String>) -> Result<Self, LetterError> {
        Ok(Self {
            template: load_template(LetterKind::ExperienceLetter)?,
            company: company.into(),
        })
    }

    /// Assemble the letter dated `issued_on` instead of the end date.
    ///
    /// Manual certificates are issued on the day they are created.
    pub fn assemble_issued_on(
        &self,
        record: &CertificateRecord,
        issued_on: NaiveDate,
    ) -> Result<LetterLayout, LetterError> {
        let name = title_case(record.student_name.trim());
        if name.is_empty() {
            return Err(LetterError::MissingField("student name"));
        }

        Ok(LetterLayout {
            kind: LetterKind::ExperienceLetter,
            source: self.render_template(record, &name, issued_on),
            subject: name,
        })
    }

    fn render_template(&self, record: &CertificateRecord, name: &str, issued_on: NaiveDate) -> String {
        format!(
            r#"{}

#experience_letter((
  company: "{}",
  issued_on: "{}",
  name: "{}",
  domain: "{}",
  position: "{}",
  certification_id: "{}",
  start: "{}",
  end: "{}",
))
"#,
            self.template,
            escape_typst_string(&self.company),
            format_date(issued_on),
            escape_typst_string(name),
            escape_typst_string(&record.domain),
            escape_typst_string(record.position.as_deref().unwrap_or_default()),
            escape_typst_string(&record.certification_id),
            format_date(record.start_date),
            format_date(record.end_date),
        )
    }
}

impl Generator<CertificateRecord> for ExperienceLetterGenerator {
    /// The letter is dated on the internship end date.
    fn assemble(&self, record: &CertificateRecord) -> Result<LetterLayout, LetterError> {
        self.assemble_issued_on(record, record.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CertificateRecord {
        CertificateRecord {
            intern_id: Some("42".to_string()),
            student_name: "ravi KUMAR".to_string(),
            domain: "Data Science".to_string(),
            position: Some("Data Science intern".to_string()),
            certification_id: "DS0425001".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
        }
    }

    #[test]
    fn test_new_generator() {
        assert!(ExperienceLetterGenerator::new("RamanaSoft").is_ok());
    }

    #[test]
    fn test_layout_carries_record_fields() {
        let generator = ExperienceLetterGenerator::new("RamanaSoft").unwrap();
        let layout = generator.assemble(&record()).unwrap();

        assert_eq!(layout.kind, LetterKind::ExperienceLetter);
        assert_eq!(layout.subject, "Ravi Kumar");
        assert!(layout.source.contains("#let experience_letter(data)"));
        assert!(layout.source.contains(r#"name: "Ravi Kumar""#));
        assert!(layout.source.contains(r#"certification_id: "DS0425001""#));
        assert!(layout.source.contains(r#"issued_on: "10/04/2024""#));
        assert!(layout.source.contains(r#"start: "10/01/2024""#));
    }

    #[test]
    fn test_issue_date_override() {
        let generator = ExperienceLetterGenerator::new("RamanaSoft").unwrap();
        let issued_on = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let layout = generator.assemble_issued_on(&record(), issued_on).unwrap();

        assert!(layout.source.contains(r#"issued_on: "02/05/2024""#));
        assert!(layout.source.contains(r#"end: "10/04/2024""#));
    }

    #[test]
    fn test_blank_position_renders_empty() {
        let generator = ExperienceLetterGenerator::new("RamanaSoft").unwrap();
        let mut record = record();
        record.position = None;

        let layout = generator.assemble(&record).unwrap();
        assert!(layout.source.contains(r#"position: """#));
    }

    #[test]
    fn test_blank_name_rejected() {
        let generator = ExperienceLetterGenerator::new("RamanaSoft").unwrap();
        let mut record = record();
        record.student_name = "   ".to_string();

        assert!(matches!(
            generator.assemble(&record),
            Err(LetterError::MissingField("student name"))
        ));
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Intern as returned by the internship-management backend.
///
/// Read-only here; registration creates it elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InternshipRecord {
    #[schema(example = "Ravi Kumar")]
    pub full_name: String,
    #[schema(example = "Data Science")]
    pub domain: String,
    #[serde(default, with = "dates::lenient_option")]
    #[schema(value_type = Option<String>, example = "2024-01-10")]
    pub date_accepted: Option<NaiveDate>,
    #[serde(default, with = "dates::lenient_option")]
    #[schema(value_type = Option<String>, example = "2024-04-10")]
    pub end_date: Option<NaiveDate>,
}

/// An issued experience letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    /// Present for system-generated records, absent for manual ones.
    #[serde(rename = "internID", default, skip_serializing_if = "Option::is_none")]
    pub intern_id: Option<String>,
    #[schema(example = "Ravi Kumar")]
    pub student_name: String,
    #[schema(example = "Data Science")]
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Data Science intern")]
    pub position: Option<String>,
    #[schema(example = "DS0425001")]
    pub certification_id: String,
    #[serde(with = "dates::lenient")]
    #[schema(value_type = String, example = "2024-01-10")]
    pub start_date: NaiveDate,
    #[serde(with = "dates::lenient")]
    #[schema(value_type = String, example = "2024-04-10")]
    pub end_date: NaiveDate,
}

impl CertificateRecord {
    pub fn origin(&self) -> CertificateOrigin {
        if self.intern_id.is_some() {
            CertificateOrigin::System
        } else {
            CertificateOrigin::Manual
        }
    }
}

/// How a certificate came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CertificateOrigin {
    /// Issued on demand for a registered intern.
    System,
    /// Issued by an administrator from the certificate form.
    Manual,
}

/// Admin form for issuing a certificate without an intern record.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualCertificateRequest {
    #[schema(example = "Anitha Reddy")]
    pub student_name: String,
    #[schema(example = "Java Full Stack")]
    pub domain: String,
    #[schema(example = "Backend Developer")]
    pub position: String,
    #[schema(value_type = String, example = "2024-02-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, example = "2024-05-01")]
    pub end_date: NaiveDate,
}

pub mod dates {
    //! Backend dates arrive either as `YYYY-MM-DD` or as full RFC 3339 timestamps.
    //!
    //! Timestamps are read as calendar dates in the issuer's local offset, so
    //! a local midnight stored as UTC (`2024-04-09T18:30:00Z` at +05:30) stays
    //! on the 10th.

    use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
    use std::sync::OnceLock;

    const DATE_FORMAT: &str = "%Y-%m-%d";
    /// India Standard Time.
    const DEFAULT_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

    static LOCAL_OFFSET: OnceLock<FixedOffset> = OnceLock::new();

    pub fn default_offset() -> FixedOffset {
        FixedOffset::east_opt(DEFAULT_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
    }

    /// Fix the offset used for timestamps. Only the first call takes effect.
    pub fn set_local_offset(offset: FixedOffset) -> bool {
        LOCAL_OFFSET.set(offset).is_ok()
    }

    pub fn local_offset() -> FixedOffset {
        *LOCAL_OFFSET.get_or_init(default_offset)
    }

    pub fn parse(value: &str) -> Option<NaiveDate> {
        parse_in(value, local_offset())
    }

    pub fn parse_in(value: &str, offset: FixedOffset) -> Option<NaiveDate> {
        let trimmed = value.trim();
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(trimmed)
                    .ok()
                    .map(|dt| dt.with_timezone(&offset).date_naive())
            })
    }

    pub mod lenient {
        use chrono::NaiveDate;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&date.format(super::DATE_FORMAT).to_string())
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
            let raw = String::deserialize(deserializer)?;
            super::parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date '{}'", raw)))
        }
    }

    /// Unparseable or missing values become `None` instead of failing the whole record.
    pub mod lenient_option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::lenient::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
            Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(super::parse))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_intern_deserialization_with_timestamps() {
        let json = r#"{
            "candidateID": 42,
            "fullName": "Ravi Kumar",
            "domain": "Data Science",
            "dateAccepted": "2024-01-10T00:00:00.000Z",
            "endDate": "2024-04-10"
        }"#;

        let intern: InternshipRecord = serde_json::from_str(json).unwrap();
        assert_eq!(intern.full_name, "Ravi Kumar");
        assert_eq!(intern.date_accepted, NaiveDate::from_ymd_opt(2024, 1, 10));
        assert_eq!(intern.end_date, NaiveDate::from_ymd_opt(2024, 4, 10));
    }

    #[test]
    fn test_timestamps_use_local_calendar_date() {
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();

        assert_eq!(
            dates::parse_in("2024-04-09T18:30:00.000Z", ist),
            NaiveDate::from_ymd_opt(2024, 4, 10)
        );
        assert_eq!(
            dates::parse_in("2024-04-09T18:30:00.000Z", utc),
            NaiveDate::from_ymd_opt(2024, 4, 9)
        );
        assert_eq!(
            dates::parse_in("2024-04-10", utc),
            NaiveDate::from_ymd_opt(2024, 4, 10)
        );
        assert_eq!(dates::default_offset(), ist);
    }

    #[test]
    fn test_intern_with_garbage_end_date_is_none() {
        let json = r#"{"fullName": "A B", "domain": "Testing Tools", "endDate": "soon"}"#;
        let intern: InternshipRecord = serde_json::from_str(json).unwrap();
        assert_eq!(intern.end_date, None);
        assert_eq!(intern.date_accepted, None);
    }

    #[test]
    fn test_certificate_wire_shape() {
        let record = CertificateRecord {
            intern_id: Some("42".to_string()),
            student_name: "Ravi Kumar".to_string(),
            domain: "Data Science".to_string(),
            position: None,
            certification_id: "DS04001".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["internID"], "42");
        assert_eq!(value["certificationId"], "DS04001");
        assert_eq!(value["startDate"], "2024-01-10");
        assert!(value.get("position").is_none());
        assert_eq!(record.origin(), CertificateOrigin::System);
    }

    #[test]
    fn test_manual_record_has_manual_origin() {
        let json = r#"{
            "studentName": "Anitha Reddy",
            "domain": "Java Full Stack",
            "position": "Backend Developer",
            "certificationId": "JFS05002",
            "startDate": "2024-02-01T00:00:00Z",
            "endDate": "2024-05-01"
        }"#;

        let record: CertificateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.origin(), CertificateOrigin::Manual);
        assert_eq!(record.position.as_deref(), Some("Backend Developer"));
    }
}

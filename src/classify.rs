// ---------------------------------------------------------------------------
// Status classification
// ---------------------------------------------------------------------------

/// How a job's free-text status counts in aggregates. The sheet has no fixed
/// status vocabulary, so this is a substring rule, not an equality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Closed,
    Cancelled,
    Open,
}

const CLOSED_MARKERS: &[&str] = &["closed", "completed", "finished"];
const CANCELLED_MARKERS: &[&str] = &["cancelled", "canceled"];

/// Closed markers win over cancelled ones, so a status matches at most one
/// financial bucket.
pub fn classify_status(raw: &str) -> StatusClass {
    let status = raw.to_lowercase();
    if CLOSED_MARKERS.iter().any(|m| status.contains(m)) {
        StatusClass::Closed
    } else if CANCELLED_MARKERS.iter().any(|m| status.contains(m)) {
        StatusClass::Cancelled
    } else {
        StatusClass::Open
    }
}

/// Soft-deleted rows are screened out before anything else looks at them.
pub fn is_deleted(raw_status: &str) -> bool {
    raw_status.trim().eq_ignore_ascii_case("deleted")
}

// ---------------------------------------------------------------------------
// Lead platforms
// ---------------------------------------------------------------------------

/// Two-letter lead source codes from the sheet's LP column. Codes nobody
/// recognizes keep their raw text instead of disappearing into "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LeadPlatform {
    Thumbtack,
    AngiesList,
    Networx,
    Referral,
    Friend,
    PastCustomer,
    Website,
    Yelp,
    Eliya,
    Dan,
    Facebook,
    Google,
    CallBack,
    Avi,
    Ben,
    NextDoor,
    Valpak,
    KnockOnDoor,
    LeadGenPro,
    Unknown,
    Other(String),
}

impl LeadPlatform {
    pub fn from_code(raw: &str) -> Self {
        let code = raw.trim();
        match code.to_uppercase().as_str() {
            "TT" => Self::Thumbtack,
            "AG" => Self::AngiesList,
            "NX" => Self::Networx,
            "RF" => Self::Referral,
            "FD" => Self::Friend,
            "PC" => Self::PastCustomer,
            "WS" => Self::Website,
            "YP" => Self::Yelp,
            "EL" => Self::Eliya,
            "DN" => Self::Dan,
            "FB" => Self::Facebook,
            "GG" => Self::Google,
            "CB" => Self::CallBack,
            "AV" => Self::Avi,
            "BN" => Self::Ben,
            "ND" => Self::NextDoor,
            "VP" => Self::Valpak,
            "NOI" => Self::KnockOnDoor,
            "LGP" => Self::LeadGenPro,
            "" | "?" => Self::Unknown,
            _ => Self::Other(code.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Thumbtack => "Thumbtack",
            Self::AngiesList => "Angies List",
            Self::Networx => "Networx",
            Self::Referral => "Referral",
            Self::Friend => "Friend",
            Self::PastCustomer => "Past Customer",
            Self::Website => "Website",
            Self::Yelp => "Yelp",
            Self::Eliya => "Eliya",
            Self::Dan => "Dan",
            Self::Facebook => "Facebook",
            Self::Google => "Google",
            Self::CallBack => "CallBack",
            Self::Avi => "Avi",
            Self::Ben => "Ben",
            Self::NextDoor => "Next Door",
            Self::Valpak => "Valpak",
            Self::KnockOnDoor => "Knock on Door",
            Self::LeadGenPro => "Lead Gen Pro",
            Self::Unknown => "Unknown",
            Self::Other(raw) => raw,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage presentation defaults
// ---------------------------------------------------------------------------

// (name, color, order) for statuses with no pipeline_stages row.
const STAGE_DEFAULTS: &[(&str, &str, i64)] = &[
    ("new lead", "#3B82F6", 1),
    ("in progress", "#F59E0B", 2),
    ("awaiting parts", "#EF4444", 3),
    ("pending payment", "#8B5CF6", 4),
    ("closed", "#10B981", 5),
    ("cancelled", "#6B7280", 6),
];

pub fn default_stage_color(name: &str) -> &'static str {
    let name = name.trim().to_lowercase();
    STAGE_DEFAULTS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, color, _)| *color)
        .unwrap_or("#6B7280")
}

pub fn default_stage_order(name: &str) -> i64 {
    let name = name.trim().to_lowercase();
    STAGE_DEFAULTS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, _, order)| *order)
        .unwrap_or(7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_detection_is_substring_and_case_insensitive() {
        assert_eq!(classify_status("Closed"), StatusClass::Closed);
        assert_eq!(classify_status("closed - paid"), StatusClass::Closed);
        assert_eq!(classify_status("COMPLETED"), StatusClass::Closed);
        assert_eq!(classify_status("Job Finished 3/4"), StatusClass::Closed);
        assert_eq!(classify_status("Cancelled"), StatusClass::Cancelled);
        assert_eq!(classify_status("canceled by customer"), StatusClass::Cancelled);
        assert_eq!(classify_status("New Lead"), StatusClass::Open);
        assert_eq!(classify_status("In Progress"), StatusClass::Open);
        assert_eq!(classify_status(""), StatusClass::Open);
    }

    #[test]
    fn test_status_matches_exactly_one_bucket() {
        // Closed markers win, so nothing lands in both financial buckets.
        assert_eq!(classify_status("closed after cancel"), StatusClass::Closed);
        assert_eq!(classify_status("cancelled then completed"), StatusClass::Closed);
    }

    #[test]
    fn test_deleted_screen() {
        assert!(is_deleted("Deleted"));
        assert!(is_deleted("  deleted "));
        assert!(!is_deleted("Closed"));
        assert!(!is_deleted("undeleted"));
    }

    #[test]
    fn test_platform_codes() {
        assert_eq!(LeadPlatform::from_code("TT"), LeadPlatform::Thumbtack);
        assert_eq!(LeadPlatform::from_code(" tt "), LeadPlatform::Thumbtack);
        assert_eq!(LeadPlatform::from_code("NOI"), LeadPlatform::KnockOnDoor);
        assert_eq!(LeadPlatform::from_code("?"), LeadPlatform::Unknown);
        assert_eq!(LeadPlatform::from_code(""), LeadPlatform::Unknown);
        assert_eq!(
            LeadPlatform::from_code("craigslist"),
            LeadPlatform::Other("craigslist".to_string())
        );
    }

    #[test]
    fn test_platform_labels() {
        assert_eq!(LeadPlatform::from_code("PC").label(), "Past Customer");
        assert_eq!(LeadPlatform::from_code("LGP").label(), "Lead Gen Pro");
        assert_eq!(LeadPlatform::from_code("zz").label(), "zz");
    }

    #[test]
    fn test_stage_defaults() {
        assert_eq!(default_stage_color("New Lead"), "#3B82F6");
        assert_eq!(default_stage_color("CLOSED"), "#10B981");
        assert_eq!(default_stage_color("Custom Stage"), "#6B7280");
        assert_eq!(default_stage_order("New Lead"), 1);
        assert_eq!(default_stage_order("Cancelled"), 6);
        assert_eq!(default_stage_order("Custom Stage"), 7);
    }
}

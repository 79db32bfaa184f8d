use serde::Serialize;
use utoipa::ToSchema;

/// A support resource listed by `GET /resources`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Resource {
    #[schema(value_type = String)]
    pub title: &'static str,
    #[schema(value_type = String)]
    pub description: &'static str,
    #[schema(value_type = String)]
    pub url: &'static str,
    /// Resource category, e.g. `exercise` or `meditation`.
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub kind: &'static str,
}

/// The fixed resource list, in display order.
pub const RESOURCES: [Resource; 2] = [
    Resource {
        title: "Breathing Exercise",
        description: "5-minute guided breathing exercise",
        url: "https://example.com/breathing",
        kind: "exercise",
    },
    Resource {
        title: "Meditation Guide",
        description: "10-minute meditation for stress relief",
        url: "https://example.com/meditation",
        kind: "meditation",
    },
];

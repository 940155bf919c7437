use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(UserId);
id_newtype!(AssetId);
id_newtype!(CategoryId);

/// Lifecycle state of an asset. Wire format matches the backend's
/// SCREAMING_SNAKE_CASE enum values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetState {
    Assigned,
    Available,
    Unavailable,
    WaitingForRecycling,
    Recycled,
}

impl AssetState {
    pub const ALL: [AssetState; 5] = [
        AssetState::Assigned,
        AssetState::Available,
        AssetState::Unavailable,
        AssetState::WaitingForRecycling,
        AssetState::Recycled,
    ];

    /// Human-readable label for list rendering.
    pub fn label(self) -> &'static str {
        match self {
            AssetState::Assigned => "Assigned",
            AssetState::Available => "Available",
            AssetState::Unavailable => "Not available",
            AssetState::WaitingForRecycling => "Waiting for recycling",
            AssetState::Recycled => "Recycled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Admin,
    Staff,
}

/// Columns the asset list accepts as a sort key. Fixed allow-list; the
/// backend rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    AssetCode,
    Name,
    Category,
    State,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::AssetCode,
        SortField::Name,
        SortField::Category,
        SortField::State,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

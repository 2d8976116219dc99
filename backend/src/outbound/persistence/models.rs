//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    area_centers, area_class10, area_class15, area_class20, area_offices, notification_history,
    users, weather_notification_rules,
};

// ---------------------------------------------------------------------------
// Area models
// ---------------------------------------------------------------------------

/// Row struct for the hierarchy root table, whose parent link is optional.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = area_centers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CenterRow {
    pub id: String,
    pub name: String,
    pub en_name: String,
    pub parent_id: Option<String>,
}

/// Declare a row struct for an area table with a mandatory parent link.
macro_rules! area_row {
    ($name:ident, $table:ident) => {
        #[derive(Debug, Clone, Queryable, Selectable)]
        #[diesel(table_name = $table)]
        #[diesel(check_for_backend(diesel::pg::Pg))]
        pub(crate) struct $name {
            pub id: String,
            pub name: String,
            pub en_name: String,
            pub parent_id: String,
        }
    };
}

area_row!(OfficeRow, area_offices);
area_row!(Class10Row, area_class10);
area_row!(Class15Row, area_class15);
area_row!(Class20Row, area_class20);

// ---------------------------------------------------------------------------
// User models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub chat_user_id: String,
    pub selected_area_office_id: Option<String>,
    pub selected_area_class15_id: Option<String>,
    pub selected_area_id: Option<String>,
    pub notify_time: Option<NaiveTime>,
    pub is_active: bool,
    pub status: String,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub chat_user_id: &'a str,
    pub selected_area_office_id: Option<&'a str>,
    pub selected_area_class15_id: Option<&'a str>,
    pub selected_area_id: Option<&'a str>,
    pub notify_time: Option<NaiveTime>,
    pub is_active: bool,
    pub status: &'a str,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full-row changeset. `treat_none_as_null` lets an update clear a column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserUpdate<'a> {
    pub selected_area_office_id: Option<&'a str>,
    pub selected_area_class15_id: Option<&'a str>,
    pub selected_area_id: Option<&'a str>,
    pub notify_time: Option<NaiveTime>,
    pub is_active: bool,
    pub status: &'a str,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Weather rule and history models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = weather_notification_rules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WeatherRuleRow {
    pub weather_code: String,
    pub weather_description: String,
    pub is_notify_trigger: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notification_history)]
pub(crate) struct NewNotificationHistoryRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_time: DateTime<Utc>,
    pub is_notify_trigger: bool,
    pub weather_codes: &'a [String],
    pub weather_data: &'a [u8],
    pub created_at: DateTime<Utc>,
}

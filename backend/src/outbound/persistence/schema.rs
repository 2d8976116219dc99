//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`
//! exactly. Regenerate with `diesel print-schema` after changing them.

diesel::table! {
    /// Regional forecast centers, the hierarchy roots.
    area_centers (id) {
        id -> Varchar,
        name -> Varchar,
        en_name -> Varchar,
        parent_id -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Forecast offices. Office ids key the forecast documents.
    area_offices (id) {
        id -> Varchar,
        name -> Varchar,
        en_name -> Varchar,
        parent_id -> Varchar,
    }
}

diesel::table! {
    area_class10 (id) {
        id -> Varchar,
        name -> Varchar,
        en_name -> Varchar,
        parent_id -> Varchar,
    }
}

diesel::table! {
    area_class15 (id) {
        id -> Varchar,
        name -> Varchar,
        en_name -> Varchar,
        parent_id -> Varchar,
    }
}

diesel::table! {
    /// Municipalities; the leaves users select.
    area_class20 (id) {
        id -> Varchar,
        name -> Varchar,
        en_name -> Varchar,
        parent_id -> Varchar,
    }
}

diesel::table! {
    /// Bot users and their registration state.
    users (id) {
        id -> Uuid,
        /// Chat platform user id (unique).
        chat_user_id -> Varchar,
        selected_area_office_id -> Nullable<Varchar>,
        selected_area_class15_id -> Nullable<Varchar>,
        selected_area_id -> Nullable<Varchar>,
        notify_time -> Nullable<Time>,
        is_active -> Bool,
        status -> Varchar,
        /// Optimistic concurrency counter.
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    weather_notification_rules (weather_code) {
        weather_code -> Varchar,
        weather_description -> Text,
        is_notify_trigger -> Bool,
    }
}

diesel::table! {
    /// Append-only evaluation audit.
    notification_history (id) {
        id -> Uuid,
        user_id -> Uuid,
        notification_time -> Timestamptz,
        is_notify_trigger -> Bool,
        weather_codes -> Array<Text>,
        /// Raw forecast document as fetched.
        weather_data -> Bytea,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(area_offices -> area_centers (parent_id));
diesel::joinable!(area_class10 -> area_offices (parent_id));
diesel::joinable!(area_class15 -> area_class10 (parent_id));
diesel::joinable!(area_class20 -> area_class15 (parent_id));
diesel::joinable!(notification_history -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    area_centers,
    area_offices,
    area_class10,
    area_class15,
    area_class20,
    users,
    notification_history,
);

//! Diesel table definitions matching `backend/migrations`.
//!
//! Regenerate with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts. Mobile, username and email are each unique when present.
    users (id) {
        id -> Uuid,
        mobile -> Varchar,
        username -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        /// Title of the role in `roles`.
        role -> Varchar,
        otp_code -> Nullable<Int4>,
        otp_expires_at -> Nullable<Timestamptz>,
        /// PHC formatted Argon2 hash.
        password_hash -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    roles (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Nullable<Varchar>,
        /// Permission titles granted by the role.
        permissions -> Array<Text>,
    }
}

diesel::table! {
    permissions (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Category forest; `parent` references another category.
    categories (id) {
        id -> Uuid,
        title -> Varchar,
        parent -> Nullable<Uuid>,
    }
}

diesel::table! {
    blogs (id) {
        id -> Uuid,
        author -> Uuid,
        title -> Varchar,
        short_text -> Text,
        text -> Text,
        image -> Nullable<Varchar>,
        tags -> Array<Text>,
        category -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    products (id) {
        id -> Uuid,
        title -> Varchar,
        short_text -> Text,
        text -> Text,
        images -> Array<Text>,
        tags -> Array<Text>,
        category -> Uuid,
        price -> Int8,
        discount -> Int8,
        count -> Int8,
        /// `physical` or `virtual`.
        kind -> Varchar,
        supplier -> Uuid,
        colors -> Array<Text>,
        width -> Float8,
        height -> Float8,
        length -> Float8,
        weight -> Float8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Courses. Chapters and their episodes are embedded as a JSONB array.
    courses (id) {
        id -> Uuid,
        title -> Varchar,
        short_desc -> Text,
        full_desc -> Text,
        image -> Varchar,
        tags -> Array<Text>,
        category -> Uuid,
        price -> Int8,
        discount -> Int8,
        kind -> Varchar,
        status -> Varchar,
        instructor -> Uuid,
        chapters -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    recipes (id) {
        id -> Uuid,
        chef -> Uuid,
        title -> Varchar,
        ingredients -> Array<Text>,
        instructions -> Array<Text>,
        time -> Varchar,
        level -> Varchar,
        image -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    projects (id) {
        id -> Uuid,
        owner -> Uuid,
        title -> Varchar,
        text -> Text,
        tags -> Array<Text>,
        image -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    coffees (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        price -> Int8,
        quantity -> Int8,
        image -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Teams. Members other than the owner are kept as a UUID array.
    teams (id) {
        id -> Uuid,
        name -> Varchar,
        handle -> Varchar,
        description -> Text,
        owner -> Uuid,
        members -> Array<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    team_invitations (id) {
        id -> Uuid,
        team -> Uuid,
        invitee -> Uuid,
        inviter -> Uuid,
        status -> Varchar,
        requested_at -> Timestamptz,
        answered_at -> Nullable<Timestamptz>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    users,
    roles,
    permissions,
    categories,
    blogs,
    products,
    courses,
    recipes,
    projects,
    coffees,
    teams,
    team_invitations,
);

//! Diesel schema for update task persistence.

diesel::table! {
    /// Ref updates recorded by the update hook, one row per ref per push.
    update_tasks (id) {
        /// Row identifier.
        id -> Uuid,
        /// Insertion order, used to break creation-time ties.
        insertion_seq -> Int8,
        /// Push correlation identifier.
        #[max_length = 255]
        correlation_id -> Varchar,
        /// Fully qualified ref name.
        ref_name -> Text,
        /// Object id before the push.
        #[max_length = 64]
        old_commit_id -> Varchar,
        /// Object id after the push.
        #[max_length = 64]
        new_commit_id -> Varchar,
        /// Dispatch status.
        #[max_length = 20]
        status -> Varchar,
        /// First ingestion timestamp.
        created_at -> Timestamptz,
        /// Latest ingestion timestamp.
        updated_at -> Timestamptz,
        /// Dispatch timestamp.
        dispatched_at -> Nullable<Timestamptz>,
    }
}

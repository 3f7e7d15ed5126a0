//! Diesel schema for task and comment persistence.

diesel::table! {
    /// Task records, one row per task, partitioned logically by owner and
    /// status column.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning user.
        owner_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Free-form description.
        description -> Text,
        /// Status column.
        #[max_length = 20]
        status -> Varchar,
        /// Priority level.
        #[max_length = 20]
        priority -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Timestamptz>,
        /// Tags as a JSON array of strings.
        tags -> Jsonb,
        /// Ordering key inside the owner's status column.
        position -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only task comments.
    task_comments (id) {
        /// Comment identifier.
        id -> Uuid,
        /// Insertion sequence used to break creation-time ties.
        seq -> Int8,
        /// Parent task.
        task_id -> Uuid,
        /// Author.
        owner_id -> Uuid,
        /// Comment text.
        content -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(task_comments -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_comments);

// Copyright (c) EntreeFox Team
// SPDX-License-Identifier: Apache-2.0

// Import diesel table macros
use diesel::{allow_tables_to_appear_in_same_query, joinable, table};

// Users are provisioned by the auth service; this crate only reads them.
table! {
    users (id) {
        id -> Integer,
        first_name -> Varchar,
        last_name -> Varchar,
        profile_image_url -> Nullable<Varchar>,
        is_verified -> Bool,
        created_at -> Timestamptz,
    }
}

// Posts carry denormalized interaction counters kept in sync with the
// likes/comments/reposts tables by the store's transactional mutations.
table! {
    posts (id) {
        id -> Integer,
        author_id -> Integer,
        content -> Text,
        media -> Jsonb,
        likes_count -> Integer,
        comments_count -> Integer,
        reposts_count -> Integer,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    likes (id) {
        id -> Integer,
        user_id -> Integer,
        post_id -> Integer,
        created_at -> Timestamptz,
    }
}

table! {
    reposts (id) {
        id -> Integer,
        user_id -> Integer,
        post_id -> Integer,
        created_at -> Timestamptz,
    }
}

table! {
    saved_posts (id) {
        id -> Integer,
        user_id -> Integer,
        post_id -> Integer,
        created_at -> Timestamptz,
    }
}

// Two-level threading: parent_id is null for top-level comments and points
// at a top-level comment for replies.
table! {
    comments (id) {
        id -> Integer,
        post_id -> Integer,
        author_id -> Integer,
        parent_id -> Nullable<Integer>,
        content -> Text,
        replies_count -> Integer,
        created_at -> Timestamptz,
    }
}

table! {
    follows (id) {
        id -> Integer,
        follower_id -> Integer,
        following_id -> Integer,
        created_at -> Timestamptz,
    }
}

joinable!(posts -> users (author_id));
joinable!(likes -> posts (post_id));
joinable!(reposts -> posts (post_id));
joinable!(saved_posts -> posts (post_id));
joinable!(comments -> posts (post_id));
joinable!(comments -> users (author_id));

// follows has two foreign keys into users, so queries join it with an
// explicit .on() clause instead of a joinable! declaration; likewise the
// user side of likes/reposts/saved_posts, whose joinable! slot is taken by
// their posts edge.
allow_tables_to_appear_in_same_query!(
    users,
    posts,
    likes,
    reposts,
    saved_posts,
    comments,
    follows,
);

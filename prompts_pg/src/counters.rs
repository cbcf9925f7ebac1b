//! SQL behind the denormalized prompt counters.
//!
//! The data migrations and [`crate::PgPromptStore`] run the same statements
//! so that a repair performed by the migrator and one performed by the store
//! always agree.

/// Recomputes `totalCopies` of every prompt from named and anonymous copies.
pub const RECONCILE_COPY_TOTALS: &str = r#"
    UPDATE prompts AS p
    SET "totalCopies" = (
        COALESCE((SELECT COUNT(*) FROM prompt_copies c WHERE c."promptId" = p.id), 0)
        + COALESCE((SELECT COUNT(*) FROM anonymous_prompt_copies a WHERE a."promptId" = p.id), 0)
    )::INTEGER
"#;

/// Recomputes `likes` of every prompt as its number of distinct voters.
pub const RECOMPUTE_LIKES: &str = r#"
    UPDATE prompts AS p
    SET likes = COALESCE(
        (SELECT COUNT(DISTINCT v."userId") FROM prompt_votes v WHERE v."promptId" = p.id),
        0
    )::INTEGER
"#;

/// Stored and recomputed counters of every prompt.
pub(crate) const COUNTER_SNAPSHOT: &str = r#"
    SELECT
        p.id,
        p."totalCopies" AS stored_total_copies,
        (
            (SELECT COUNT(*) FROM prompt_copies c WHERE c."promptId" = p.id)
            + (SELECT COUNT(*) FROM anonymous_prompt_copies a WHERE a."promptId" = p.id)
        ) AS named_and_anonymous_copies,
        p.likes AS stored_likes,
        (SELECT COUNT(DISTINCT v."userId") FROM prompt_votes v WHERE v."promptId" = p.id)
            AS distinct_voters
    FROM prompts p
    ORDER BY p."createdAt", p.id
"#;

use crate::domain::documents::{FilterColumn, ListScope};

const SELECT_SUMMARY: &str = r#"SELECT d.id, d.own_id, d.name, d.mime, d.is_file, d.public, d.created_at,
       COALESCE(array_agg(DISTINCT u.username) FILTER (WHERE u.username IS NOT NULL), '{}') AS granted_users,
       COALESCE(array_agg(DISTINCT g.granted_user_id) FILTER (WHERE g.granted_user_id IS NOT NULL), '{}') AS granted_user_ids
FROM documents d
LEFT JOIN document_grants g ON g.document_id = d.id
LEFT JOIN users u ON u.id = g.granted_user_id"#;

// Byte-order name collation, the same order `sort_for_listing` applies.
const GROUP_AND_ORDER: &str = "GROUP BY d.id\nORDER BY d.name COLLATE \"C\" ASC, d.created_at DESC";

/// Listing statement for a scope. The filter column is the only interpolated
/// fragment and comes from the closed `FilterColumn` set.
///
/// Parameters, owner scope: `$1` requester, `$2` filter value, `$3` limit.
/// Shared scope: `$1` library owner, `$2` requester, `$3` filter value, `$4` limit.
pub fn build_list_query(scope: &ListScope, column: FilterColumn) -> String {
    let col = column.column();
    match scope {
        ListScope::Owner => format!(
            "{SELECT_SUMMARY}\nWHERE d.own_id = $1 AND d.{col} = $2\n{GROUP_AND_ORDER}\nLIMIT $3"
        ),
        ListScope::Shared { .. } => format!(
            "{SELECT_SUMMARY}\nWHERE d.own_id = $1\n  AND (d.public = TRUE OR EXISTS (\n    SELECT 1 FROM document_grants vg\n    WHERE vg.document_id = d.id AND vg.granted_user_id = $2))\n  AND d.{col} = $3\n{GROUP_AND_ORDER}\nLIMIT $4"
        ),
    }
}

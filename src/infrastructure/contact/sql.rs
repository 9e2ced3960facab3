//! Dynamic SQL for contact listings
//!
//! Column names come only from [`ContactField`]; caller text reaches the
//! statement as bind parameters.

use sqlx::{Postgres, QueryBuilder};

use crate::domain::contact::{ContactField, ContactQuery};
use crate::domain::user::UserId;

pub(crate) const CONTACT_COLUMNS: &str =
    "contact_id, user_id, first_name, last_name, phone_number, email_address, address, created_at";

/// Escape LIKE metacharacters and wrap in `%..%`
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');

    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }

    pattern.push('%');
    pattern
}

/// Column expression a filter compares against. Text columns hold escaped
/// HTML, so they are unescaped in the same order as `unescape_html`.
pub(crate) fn filter_column(field: ContactField) -> String {
    match field {
        ContactField::PhoneNumber => field.name().to_string(),
        _ => format!(
            "replace(replace(replace(replace(replace({}, '&lt;', '<'), '&gt;', '>'), \
             '&quot;', '\"'), '&#x27;', ''''), '&amp;', '&')",
            field.name()
        ),
    }
}

fn push_where(builder: &mut QueryBuilder<'static, Postgres>, owner: UserId, query: &ContactQuery) {
    builder.push(" WHERE user_id = ").push_bind(owner.value());

    for filter in &query.filters {
        if filter.matches_nothing() {
            builder.push(" AND FALSE");
            continue;
        }

        builder
            .push(" AND ")
            .push(filter_column(filter.field))
            .push(" ILIKE ")
            .push_bind(like_pattern(&filter.value))
            .push(" ESCAPE '\\'");
    }
}

/// `SELECT COUNT(*)` over the owner's filtered contacts
pub(crate) fn count_query(owner: UserId, query: &ContactQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM contacts");
    push_where(&mut builder, owner, query);
    builder
}

/// One sorted page of the owner's filtered contacts
pub(crate) fn page_query(owner: UserId, query: &ContactQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM contacts", CONTACT_COLUMNS));
    push_where(&mut builder, owner, query);

    builder
        .push(" ORDER BY ")
        .push(query.sort_by.name())
        .push(" ")
        .push(query.sort_order.as_sql())
        .push(", contact_id ASC LIMIT ")
        .push_bind(i64::from(query.page_size))
        .push(" OFFSET ")
        .push_bind(query.offset() as i64);

    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contact::SortOrder;

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("jo"), "%jo%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_count_query_is_owner_scoped() {
        let builder = count_query(UserId::new(1), &ContactQuery::new());
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM contacts WHERE user_id = $1");
    }

    #[test]
    fn test_filters_are_bound() {
        let query = ContactQuery::new()
            .with_filter(ContactField::FirstName, "Jo'; DROP TABLE contacts; --")
            .with_filter(ContactField::EmailAddress, "example");

        let builder = count_query(UserId::new(1), &query);

        assert_eq!(
            builder.sql(),
            format!(
                "SELECT COUNT(*) FROM contacts WHERE user_id = $1 \
                 AND {} ILIKE $2 ESCAPE '\\' AND {} ILIKE $3 ESCAPE '\\'",
                filter_column(ContactField::FirstName),
                filter_column(ContactField::EmailAddress)
            )
        );
        assert!(!builder.sql().contains("DROP"));
    }

    #[test]
    fn test_text_filters_compare_unescaped_values() {
        let column = filter_column(ContactField::LastName);

        assert!(column.starts_with("replace(replace(replace(replace(replace(last_name, '&lt;'"));
        assert!(column.contains("'&#x27;', ''''"));
        assert!(column.ends_with("'&amp;', '&')"));
        assert_eq!(filter_column(ContactField::PhoneNumber), "phone_number");
    }

    #[test]
    fn test_phone_filter_without_digits_is_false() {
        let query = ContactQuery::new().with_filter(ContactField::PhoneNumber, "abc");

        let builder = count_query(UserId::new(1), &query);

        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM contacts WHERE user_id = $1 AND FALSE"
        );
    }

    #[test]
    fn test_page_query_sort_and_paging() {
        let query = ContactQuery::new()
            .with_sort(ContactField::PhoneNumber, SortOrder::Desc)
            .with_page(2)
            .with_page_size(25);

        let builder = page_query(UserId::new(9), &query);

        assert_eq!(
            builder.sql(),
            format!(
                "SELECT {} FROM contacts WHERE user_id = $1 \
                 ORDER BY phone_number DESC, contact_id ASC LIMIT $2 OFFSET $3",
                CONTACT_COLUMNS
            )
        );
    }

    #[test]
    fn test_unknown_sort_falls_back_to_last_name() {
        let sort_by = ContactField::parse("drop table").unwrap_or_default();
        let query = ContactQuery::new().with_sort(sort_by, SortOrder::parse("sideways"));

        let builder = page_query(UserId::new(1), &query);

        assert!(builder.sql().contains("ORDER BY last_name ASC, contact_id ASC"));
        assert!(!builder.sql().contains("drop table"));
    }
}

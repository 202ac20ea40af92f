use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use racar_core::{
    Collection, Document, DocumentData, DocumentId, DocumentRef, MonotonicClock, ServerTimestamp,
};

use super::{
    new_document_id, validate_field, DocumentStore, FieldFilter, FilterOp, SortDirection,
    StoreError,
};
use crate::DbPool;

/// Documents live in a single `document` table as JSON text; filters and
/// orderings are evaluated with SQLite's JSON functions.
pub struct SqliteDocumentStore {
    pool: DbPool,
    clock: MonotonicClock,
}

impl SqliteDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool, clock: MonotonicClock::default() }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn json_path(field: &str) -> Result<String, StoreError> {
    validate_field(field)?;
    Ok(format!("$.{field}"))
}

fn push_scalar(query: &mut QueryBuilder<'_, Sqlite>, filter: &FieldFilter) -> Result<(), StoreError> {
    match &filter.value {
        Value::String(text) => {
            query.push_bind(text.clone());
        }
        // json_extract yields 1/0 for JSON booleans
        Value::Bool(flag) => {
            query.push_bind(i64::from(*flag));
        }
        Value::Number(number) => match number.as_i64() {
            Some(integer) => {
                query.push_bind(integer);
            }
            None => {
                query.push_bind(number.as_f64().unwrap_or_default());
            }
        },
        _ => return Err(StoreError::UnsupportedFilterValue(filter.field.clone())),
    }
    Ok(())
}

fn decode_row(collection: Collection, row: &SqliteRow) -> Result<Document, StoreError> {
    let id: String = row.try_get("id")?;
    let raw: String = row.try_get("data_json")?;
    let data = serde_json::from_str::<DocumentData>(&raw)
        .map_err(|error| StoreError::Decode(format!("document `{collection}/{id}`: {error}")))?;
    Ok(Document { reference: DocumentRef::new(collection, DocumentId(id)), data })
}

fn decode_rows(collection: Collection, rows: Vec<SqliteRow>) -> Result<Vec<Document>, StoreError> {
    rows.iter().map(|row| decode_row(collection, row)).collect()
}

#[async_trait::async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, data_json FROM document WHERE collection = ? ORDER BY seq ASC",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;
        decode_rows(collection, rows)
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &FieldFilter,
    ) -> Result<Vec<Document>, StoreError> {
        filter.validate()?;
        let path = json_path(&filter.field)?;

        let mut query =
            QueryBuilder::<Sqlite>::new("SELECT id, data_json FROM document WHERE collection = ");
        query.push_bind(collection.as_str());
        match filter.op {
            FilterOp::Equal => {
                query.push(" AND json_extract(data_json, ");
                query.push_bind(path);
                query.push(") = ");
                push_scalar(&mut query, filter)?;
            }
            FilterOp::ArrayContains => {
                query.push(" AND json_type(data_json, ");
                query.push_bind(path.clone());
                query.push(") = 'array' AND EXISTS (SELECT 1 FROM json_each(data_json, ");
                query.push_bind(path);
                query.push(") WHERE json_each.value = ");
                push_scalar(&mut query, filter)?;
                query.push(")");
            }
        }
        query.push(" ORDER BY seq ASC");

        let rows = query.build().fetch_all(&self.pool).await?;
        decode_rows(collection, rows)
    }

    async fn get_by_id(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query("SELECT id, data_json FROM document WHERE collection = ? AND id = ?")
            .bind(collection.as_str())
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| decode_row(collection, &row)).transpose()
    }

    async fn insert(
        &self,
        collection: Collection,
        data: DocumentData,
    ) -> Result<DocumentId, StoreError> {
        let id = new_document_id();
        let data_json =
            serde_json::to_string(&data).map_err(|error| StoreError::Encode(error.to_string()))?;

        sqlx::query(
            "INSERT INTO document (collection, id, data_json, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(collection.as_str())
        .bind(&id.0)
        .bind(data_json)
        .bind(self.clock.now().to_string())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn insert_unique(
        &self,
        collection: Collection,
        data: DocumentData,
        unique_field: &str,
    ) -> Result<DocumentId, StoreError> {
        let Some(value) = data.get(unique_field).cloned() else {
            validate_field(unique_field)?;
            return self.insert(collection, data).await;
        };
        let guard = FieldFilter::equal(unique_field, value);
        guard.validate()?;
        let path = json_path(unique_field)?;

        let id = new_document_id();
        let data_json =
            serde_json::to_string(&data).map_err(|error| StoreError::Encode(error.to_string()))?;

        // one statement, so the existence check and the write share a single write lock
        let mut query = QueryBuilder::<Sqlite>::new(
            "INSERT INTO document (collection, id, data_json, created_at) SELECT ",
        );
        query.push_bind(collection.as_str());
        query.push(", ");
        query.push_bind(id.0.clone());
        query.push(", ");
        query.push_bind(data_json);
        query.push(", ");
        query.push_bind(self.clock.now().to_string());
        query.push(" WHERE NOT EXISTS (SELECT 1 FROM document WHERE collection = ");
        query.push_bind(collection.as_str());
        query.push(" AND json_extract(data_json, ");
        query.push_bind(path);
        query.push(") = ");
        push_scalar(&mut query, &guard)?;
        query.push(")");

        let taken = || StoreError::UniqueViolation {
            field: guard.field.clone(),
            value: guard.value.clone(),
        };
        match query.build().execute(&self.pool).await {
            Ok(done) if done.rows_affected() == 1 => Ok(id),
            Ok(_) => Err(taken()),
            Err(sqlx::Error::Database(error)) if error.is_unique_violation() => Err(taken()),
            Err(error) => Err(error.into()),
        }
    }

    async fn list_ordered(
        &self,
        collection: Collection,
        field: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, StoreError> {
        let path = json_path(field)?;
        let direction = direction.as_sql();
        let sql = format!(
            "SELECT id, data_json FROM document \
             WHERE collection = ? AND json_type(data_json, ?) IS NOT NULL \
             ORDER BY json_extract(data_json, ?) {direction}, seq {direction}"
        );

        let rows = sqlx::query(&sql)
            .bind(collection.as_str())
            .bind(&path)
            .bind(&path)
            .fetch_all(&self.pool)
            .await?;
        decode_rows(collection, rows)
    }

    fn server_timestamp(&self) -> ServerTimestamp {
        self.clock.now()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use racar_core::{Collection, DocumentData};

    use crate::store::{DocumentStore, FieldFilter, SortDirection, SqliteDocumentStore, StoreError};
    use crate::{connect_with_settings, migrations};

    async fn store() -> SqliteDocumentStore {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqliteDocumentStore::new(pool)
    }

    fn data(value: serde_json::Value) -> DocumentData {
        value.as_object().cloned().expect("object literal")
    }

    #[tokio::test]
    async fn equality_filter_compares_strings_and_integers() {
        let store = store().await;
        store
            .insert(Collection::Products, data(json!({ "nombre": "Filtro A", "anioInicio": 2010 })))
            .await
            .expect("insert");
        store
            .insert(Collection::Products, data(json!({ "nombre": "Filtro B", "anioInicio": 2012 })))
            .await
            .expect("insert");

        let by_name = store
            .find(Collection::Products, &FieldFilter::equal("nombre", "Filtro B"))
            .await
            .expect("find by name");
        let by_year = store
            .find(Collection::Products, &FieldFilter::equal("anioInicio", 2010))
            .await
            .expect("find by year");

        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].field("anioInicio"), Some(&json!(2012)));
        assert_eq!(by_year.len(), 1);
        assert_eq!(by_year[0].field("nombre"), Some(&json!("Filtro A")));
    }

    #[tokio::test]
    async fn array_contains_ignores_scalar_fields() {
        let store = store().await;
        store
            .insert(Collection::Products, data(json!({ "nombre": "lista", "modelo": ["modelo/a", "modelo/b"] })))
            .await
            .expect("insert");
        store
            .insert(Collection::Products, data(json!({ "nombre": "escalar", "modelo": "modelo/b" })))
            .await
            .expect("insert");

        let found = store
            .find(Collection::Products, &FieldFilter::array_contains("modelo", "modelo/b"))
            .await
            .expect("find");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field("nombre"), Some(&json!("lista")));
    }

    #[tokio::test]
    async fn collections_do_not_leak_into_each_other() {
        let store = store().await;
        store.insert(Collection::Brands, data(json!({ "slug": "toyota" }))).await.expect("insert");

        let models = store
            .find(Collection::Models, &FieldFilter::equal("slug", "toyota"))
            .await
            .expect("find");

        assert!(models.is_empty());
        assert_eq!(store.list(Collection::Brands).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn descending_listing_orders_by_field_and_omits_missing() {
        let store = store().await;
        for (body, fecha) in [
            ("primero", Some("2025-01-01T00:00:00.000000000Z")),
            ("sin fecha", None),
            ("segundo", Some("2025-06-01T00:00:00.000000000Z")),
        ] {
            let mut doc = data(json!({ "comentario": body }));
            if let Some(fecha) = fecha {
                doc.insert("fecha".into(), json!(fecha));
            }
            store.insert(Collection::Comments, doc).await.expect("insert");
        }

        let ordered = store
            .list_ordered(Collection::Comments, "fecha", SortDirection::Descending)
            .await
            .expect("ordered");

        let bodies = ordered.iter().filter_map(|doc| doc.field("comentario")).cloned().collect::<Vec<_>>();
        assert_eq!(bodies, vec![json!("segundo"), json!("primero")]);
    }

    #[tokio::test]
    async fn injected_field_names_are_rejected_before_querying() {
        let store = store().await;

        let result = store
            .find(Collection::Products, &FieldFilter::equal("nombre') OR 1=1 --", "x"))
            .await;

        assert!(matches!(result, Err(StoreError::InvalidFieldPath(_))));
    }

    #[tokio::test]
    async fn ping_fails_once_the_pool_is_closed() {
        let store = store().await;
        assert!(store.ping().await.is_ok());

        store.pool().close().await;

        assert!(matches!(store.ping().await, Err(StoreError::Database(_))));
    }

    #[tokio::test]
    async fn unique_insert_refuses_a_second_slug_and_keeps_the_first() {
        let store = store().await;
        let first = store
            .insert_unique(Collection::Brands, data(json!({ "slug": "toyota", "nombre": "Toyota" })), "slug")
            .await
            .expect("first insert");

        let second = store
            .insert_unique(Collection::Brands, data(json!({ "slug": "toyota", "nombre": "Otra" })), "slug")
            .await;

        assert!(matches!(second, Err(StoreError::UniqueViolation { .. })));
        let brands = store.list(Collection::Brands).await.expect("list");
        assert_eq!(brands.len(), 1);
        assert_eq!(brands[0].id(), &first);
    }

    #[tokio::test]
    async fn slug_index_blocks_plain_duplicate_inserts() {
        let store = store().await;
        store.insert(Collection::Models, data(json!({ "slug": "corolla" }))).await.expect("insert");

        let duplicate = store.insert(Collection::Models, data(json!({ "slug": "corolla" }))).await;
        let other_collection =
            store.insert(Collection::Brands, data(json!({ "slug": "corolla" }))).await;

        assert!(matches!(duplicate, Err(StoreError::Database(_))));
        assert!(other_collection.is_ok());
    }
}

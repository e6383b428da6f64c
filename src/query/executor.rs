use tracing::debug;

use super::{fmt, Error, QueryModel, RESPONSE_FRAME};
use crate::client::GraphClient;
use crate::frame::{decode_rows, Frame};

/// Runs one data query end to end: parse the JSON body, clean the query
/// text, execute it and decode the resulting rows into a frame.
///
/// A query with an empty result set yields no frame at all.
pub async fn run_query<C: GraphClient>(client: &C, body: &[u8]) -> Result<Option<Frame>, Error> {
    let model: QueryModel = serde_json::from_slice(body)?;

    let cleaned = fmt::clean_query_text(&model.query_text);
    debug!(query = %cleaned, "running cleaned query");

    let rows = client.query(&cleaned).await?;
    debug!(rows = rows.len(), "query returned");

    Ok(decode_rows(RESPONSE_FRAME, &rows)?)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::client::mock::MockClient;
    use crate::frame::{FieldValues, Row};

    fn row(value: Value) -> Row {
        value.as_object().expect("row must be an object").clone()
    }

    fn body(query_text: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "datasourceId": 1,
            "intervalMs": 1000,
            "maxDataPoints": 100,
            "queryText": query_text,
            "refId": "A",
        }))
        .expect("serializable body")
    }

    #[tokio::test]
    async fn test_with_valid_query() {
        let client = MockClient::default().rows(vec![
            row(json!({"time": "2024-05-01T00:00:00Z", "value": 1.0})),
            row(json!({"time": "2024-05-01T00:00:01Z", "value": 2.0})),
        ]);

        let frame = run_query(&client, &body("select Series { time, value }"))
            .await
            .expect("no error")
            .expect("frame");

        assert_eq!(frame.name, "response");
        assert_eq!(frame.fields.len(), 2);
        assert_eq!(frame.fields[1].values, FieldValues::Number(vec![1.0, 2.0]));
    }

    #[tokio::test]
    async fn test_with_cleaned_query_text() {
        let client = MockClient::default();

        run_query(&client, &body("  select Series {\n    value,\n  }  "))
            .await
            .expect("no error");

        assert_eq!(client.seen(), vec!["select Series {\nvalue,\n}"]);
    }

    #[tokio::test]
    async fn test_with_empty_result() {
        let client = MockClient::default();

        let frame = run_query(&client, &body("select Series")).await.expect("no error");
        assert!(frame.is_none(), "empty result should yield no frame");
    }

    #[tokio::test]
    async fn test_with_malformed_body() {
        let client = MockClient::default();

        let result = run_query(&client, b"{not json").await;
        assert!(matches!(result, Err(Error::ParseBody(_))));
        assert!(client.seen().is_empty(), "driver should not be called");
    }

    #[tokio::test]
    async fn test_with_driver_error() {
        let client = MockClient::default().failing("relation does not exist");

        let result = run_query(&client, &body("select Missing")).await;
        assert!(matches!(
            result,
            Err(Error::Execute(ref e)) if e.to_string().contains("relation does not exist")
        ));
    }

    #[tokio::test]
    async fn test_with_decode_error() {
        let client = MockClient::default().rows(vec![row(json!({"time": "not a time"}))]);

        let result = run_query(&client, &body("select Series { time }")).await;
        assert!(matches!(result, Err(Error::Decode(_))));
    }
}

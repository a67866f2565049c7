#[cfg(test)]
mod tests {
    use rowbind::{Record, Value};
    use serde_json::json;
    use std::cmp::Ordering;
    use time::macros::datetime;
    use uuid::Uuid;

    #[test]
    fn value_null() {
        assert_eq!(Value::Null, Value::Null);
        assert_eq!(Value::default(), Value::Null);
        assert_ne!(Value::Int64(0), Value::Null);
        assert!(Value::Null.is_null());
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some("text")), Value::Varchar("text".into()));
    }

    #[test]
    fn value_numbers() {
        assert_eq!(Value::from(5), Value::Int64(5));
        assert_eq!(Value::Int64(5), Value::Float64(5.0));
        assert_ne!(Value::Int64(5), Value::Float64(5.5));
        assert_eq!(Value::Float64(5.0).as_i64(), Some(5));
        assert_eq!(Value::Float64(5.5).as_i64(), None);
        assert_eq!(Value::Int64(5).key(), Value::Float64(5.0).key());
        assert_ne!(Value::Int64(1), Value::Boolean(true));
    }

    #[test]
    fn value_uuid() {
        let uuid = Uuid::new_v4();
        let text = uuid.to_string();
        assert_eq!(Value::Uuid(uuid), Value::Varchar(text.clone()));
        assert_eq!(Value::Varchar(text.to_uppercase()), Value::Uuid(uuid));
        assert_eq!(Value::Uuid(uuid).key(), Value::Varchar(text.to_uppercase()).key());
        assert_ne!(Value::Uuid(uuid), Value::Varchar("not an uuid".into()));
        assert_ne!(Value::new_id(), Value::new_id());
    }

    #[test]
    fn value_compare() {
        assert_eq!(Value::Null.compare(&Value::Int64(-10)), Ordering::Less);
        assert_eq!(Value::Int64(2).compare(&Value::Float64(1.5)), Ordering::Greater);
        assert_eq!(
            Value::from("apple").compare(&Value::from("banana")),
            Ordering::Less
        );
        let earlier = Value::Timestamp(datetime!(2024-03-01 10:00 UTC));
        let later = Value::Timestamp(datetime!(2024-03-01 10:00:01 UTC));
        assert_eq!(earlier.compare(&later), Ordering::Less);
        assert_eq!(later.compare(&later.clone()), Ordering::Equal);
    }

    #[test]
    fn value_json() {
        let value = Value::from(json!({
            "name": "Ada",
            "age": 36,
            "ratio": 0.5,
            "tags": ["math", "engines"],
            "spouse": null,
        }));
        let record = value.as_map().expect("An object must become a record");
        assert_eq!(record.value("age"), &Value::Int64(36));
        assert_eq!(record.value("ratio"), &Value::Float64(0.5));
        assert_eq!(
            record.value("tags").as_list().map(<[Value]>::len),
            Some(2)
        );
        assert!(record.value("spouse").is_null());
        assert!(record.value("missing").is_null());
        let text = value.to_json_text();
        assert_eq!(Value::parse_json_text(&text).unwrap(), value);
        assert!(Value::parse_json_text("{ broken").is_err());
        let timestamp = Value::Timestamp(datetime!(2024-03-01 10:00 UTC));
        assert_eq!(timestamp.to_json(), json!("2024-03-01T10:00:00Z"));
    }

    #[test]
    fn record_json() {
        let record = Record::from_json(json!({ "id": 7, "title": "First" })).unwrap();
        assert!(record.has_id());
        assert_eq!(record.to_json(), json!({ "id": 7, "title": "First" }));
        assert!(Record::from_json(json!([1, 2])).is_err());
        assert!(Record::try_from(json!("text")).is_err());
        let record = Record::new().with("id", Value::Null).with("title", "Draft");
        assert!(!record.has_id());
        assert_eq!(record.id(), None);
        let collected = Record::from_iter([("a", 1), ("b", 2)]);
        assert_eq!(collected.keys().collect::<Vec<_>>(), ["a", "b"]);
    }
}

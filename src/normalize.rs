//! Conversion of raw custom-object payloads into [`OrderRecord`]s.

use crate::domain::{OrderField, OrderRecord, RawRecord};

/// Map a raw record onto the fixed order shape.
///
/// Total: absent keys and `null` values both become `""`. Values are copied
/// verbatim, with no trimming or type coercion.
pub fn normalize(raw: &RawRecord) -> OrderRecord {
    OrderField::ALL
        .iter()
        .fold(OrderRecord::default(), |mut record, field| {
            if let Some(Some(value)) = raw.properties.get(field.property()) {
                *record.get_mut(*field) = value.clone();
            }
            record
        })
}

/// Normalize a sequence of raw records, preserving order.
pub fn normalize_all(raw: &[RawRecord]) -> Vec<OrderRecord> {
    raw.iter().map(normalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn raw(properties: &[(&str, Option<&str>)]) -> RawRecord {
        RawRecord {
            id: "1".to_string(),
            properties: properties
                .iter()
                .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_normalize_full_payload() {
        let record = normalize(&raw(&[
            ("customer_name", Some("Ada Lovelace")),
            ("hpl_id", Some("HPL-9")),
            ("order_num", Some("SO-1001")),
            ("channel", Some("Web")),
            ("date", Some("2024-03-01")),
            ("fulfillment", Some("Shipped")),
            ("hubspot_id", Some("551")),
            ("product_name", Some("Widget")),
            ("qty", Some("2")),
            ("sales_price", Some("12.50")),
            ("sku", Some("W-1")),
            ("total", Some("25.00")),
        ]));

        assert_eq!(record.customer_name, "Ada Lovelace");
        assert_eq!(record.hpl_id, "HPL-9");
        assert_eq!(record.order_num, "SO-1001");
        assert_eq!(record.channel, "Web");
        assert_eq!(record.date, "2024-03-01");
        assert_eq!(record.fulfillment, "Shipped");
        assert_eq!(record.hubspot_id, "551");
        assert_eq!(record.product_name, "Widget");
        assert_eq!(record.qty, "2");
        assert_eq!(record.sales_price, "12.50");
        assert_eq!(record.sku, "W-1");
        assert_eq!(record.total, "25.00");
    }

    #[test]
    fn test_normalize_defaults_missing_and_null() {
        let record = normalize(&raw(&[("sku", Some("W-1")), ("total", None)]));
        assert_eq!(record.sku, "W-1");
        assert_eq!(record.total, "");
        assert_eq!(record.customer_name, "");

        let empty = normalize(&RawRecord::default());
        assert_eq!(empty, OrderRecord::default());
    }

    #[test]
    fn test_normalize_each_field_missing_independently() {
        for missing in OrderField::ALL {
            let props: Vec<(&str, Option<&str>)> = OrderField::ALL
                .iter()
                .filter(|f| **f != missing)
                .map(|f| (f.property(), Some("x")))
                .collect();
            let record = normalize(&raw(&props));
            for field in OrderField::ALL {
                let expected = if field == missing { "" } else { "x" };
                assert_eq!(record.get(field), expected, "field {}", field);
            }
        }
    }

    #[test]
    fn test_normalize_ignores_unknown_properties_and_keeps_text() {
        let record = normalize(&raw(&[
            ("hs_object_id", Some("1")),
            ("total", Some(" $1,200.00 ")),
        ]));
        assert_eq!(record.total, " $1,200.00 ");
        assert_eq!(record.values().filter(|v| !v.is_empty()).count(), 1);
    }

    #[test]
    fn test_normalize_all_preserves_order() {
        let first = raw(&[("sku", Some("A"))]);
        let second = raw(&[("sku", Some("B"))]);
        let records = normalize_all(&[first, second]);
        assert_eq!(records[0].sku, "A");
        assert_eq!(records[1].sku, "B");
    }
}

//! The normalized order record and its field catalogue.

use serde::{Deserialize, Serialize};

/// One order line, flattened from a custom-object record.
///
/// Every field is a string and defaults to `""`. Numeric-looking values
/// (quantities, prices) stay textual here; interpretation happens in the
/// query engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderRecord {
    pub customer_name: String,
    pub hpl_id: String,
    pub order_num: String,
    pub channel: String,
    pub date: String,
    pub fulfillment: String,
    pub hubspot_id: String,
    pub product_name: String,
    pub qty: String,
    pub sales_price: String,
    pub sku: String,
    pub total: String,
}

impl OrderRecord {
    /// Value of a single field.
    pub fn get(&self, field: OrderField) -> &str {
        match field {
            OrderField::CustomerName => &self.customer_name,
            OrderField::HplId => &self.hpl_id,
            OrderField::OrderNum => &self.order_num,
            OrderField::Channel => &self.channel,
            OrderField::Date => &self.date,
            OrderField::Fulfillment => &self.fulfillment,
            OrderField::HubspotId => &self.hubspot_id,
            OrderField::ProductName => &self.product_name,
            OrderField::Qty => &self.qty,
            OrderField::SalesPrice => &self.sales_price,
            OrderField::Sku => &self.sku,
            OrderField::Total => &self.total,
        }
    }

    pub(crate) fn get_mut(&mut self, field: OrderField) -> &mut String {
        match field {
            OrderField::CustomerName => &mut self.customer_name,
            OrderField::HplId => &mut self.hpl_id,
            OrderField::OrderNum => &mut self.order_num,
            OrderField::Channel => &mut self.channel,
            OrderField::Date => &mut self.date,
            OrderField::Fulfillment => &mut self.fulfillment,
            OrderField::HubspotId => &mut self.hubspot_id,
            OrderField::ProductName => &mut self.product_name,
            OrderField::Qty => &mut self.qty,
            OrderField::SalesPrice => &mut self.sales_price,
            OrderField::Sku => &mut self.sku,
            OrderField::Total => &mut self.total,
        }
    }

    /// All twelve values, in `OrderField::ALL` order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        OrderField::ALL.iter().map(move |field| self.get(*field))
    }
}

/// Column of an [`OrderRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderField {
    CustomerName,
    HplId,
    OrderNum,
    Channel,
    Date,
    Fulfillment,
    HubspotId,
    ProductName,
    Qty,
    SalesPrice,
    Sku,
    Total,
}

impl OrderField {
    pub const ALL: [OrderField; 12] = [
        OrderField::CustomerName,
        OrderField::HplId,
        OrderField::OrderNum,
        OrderField::Channel,
        OrderField::Date,
        OrderField::Fulfillment,
        OrderField::HubspotId,
        OrderField::ProductName,
        OrderField::Qty,
        OrderField::SalesPrice,
        OrderField::Sku,
        OrderField::Total,
    ];

    /// Columns shown in the order table, left to right.
    pub const DISPLAY_COLUMNS: [OrderField; 9] = [
        OrderField::Date,
        OrderField::Sku,
        OrderField::ProductName,
        OrderField::Qty,
        OrderField::SalesPrice,
        OrderField::Total,
        OrderField::Fulfillment,
        OrderField::Channel,
        OrderField::OrderNum,
    ];

    /// Key used in serialized records and sort configuration.
    pub fn key(&self) -> &'static str {
        match self {
            OrderField::CustomerName => "customerName",
            OrderField::HplId => "hplId",
            OrderField::OrderNum => "orderNum",
            OrderField::Channel => "channel",
            OrderField::Date => "date",
            OrderField::Fulfillment => "fulfillment",
            OrderField::HubspotId => "hubspotId",
            OrderField::ProductName => "productName",
            OrderField::Qty => "qty",
            OrderField::SalesPrice => "salesPrice",
            OrderField::Sku => "sku",
            OrderField::Total => "total",
        }
    }

    /// Name of the upstream custom-object property.
    pub fn property(&self) -> &'static str {
        match self {
            OrderField::CustomerName => "customer_name",
            OrderField::HplId => "hpl_id",
            OrderField::OrderNum => "order_num",
            OrderField::Channel => "channel",
            OrderField::Date => "date",
            OrderField::Fulfillment => "fulfillment",
            OrderField::HubspotId => "hubspot_id",
            OrderField::ProductName => "product_name",
            OrderField::Qty => "qty",
            OrderField::SalesPrice => "sales_price",
            OrderField::Sku => "sku",
            OrderField::Total => "total",
        }
    }

    /// Column header label.
    pub fn label(&self) -> &'static str {
        match self {
            OrderField::CustomerName => "Customer",
            OrderField::HplId => "HPL ID",
            OrderField::OrderNum => "Order No",
            OrderField::Channel => "Channel",
            OrderField::Date => "Date",
            OrderField::Fulfillment => "Fulfillment",
            OrderField::HubspotId => "HubSpot ID",
            OrderField::ProductName => "Product Name",
            OrderField::Qty => "Qty",
            OrderField::SalesPrice => "Sales",
            OrderField::Sku => "SKU",
            OrderField::Total => "Total",
        }
    }

    /// The twelve property names requested from the batch-read endpoint.
    pub fn properties() -> Vec<&'static str> {
        Self::ALL.iter().map(|field| field.property()).collect()
    }
}

impl std::fmt::Display for OrderField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for OrderField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderField::ALL
            .iter()
            .find(|field| field.key() == s)
            .copied()
            .ok_or_else(|| format!("Invalid order field: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_with_camel_case_keys() {
        let record = OrderRecord {
            customer_name: "Ada".to_string(),
            sales_price: "9.99".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["customerName"], "Ada");
        assert_eq!(json["salesPrice"], "9.99");
        assert_eq!(json["hubspotId"], "");
        assert_eq!(json.as_object().unwrap().len(), 12);
    }

    #[test]
    fn test_record_deserializes_with_missing_keys() {
        let record: OrderRecord = serde_json::from_str(r#"{"sku": "A-1"}"#).unwrap();
        assert_eq!(record.sku, "A-1");
        assert_eq!(record.total, "");
    }

    #[test]
    fn test_field_keys_round_trip_through_from_str() {
        for field in OrderField::ALL {
            assert_eq!(field.key().parse::<OrderField>().unwrap(), field);
        }
        assert!("customer_name".parse::<OrderField>().is_err());
    }

    #[test]
    fn test_field_key_matches_serde_name() {
        for field in OrderField::ALL {
            let json = serde_json::to_value(field).unwrap();
            assert_eq!(json, field.key());
        }
    }

    #[test]
    fn test_get_mut_addresses_the_same_field_as_get() {
        let mut record = OrderRecord::default();
        for (i, field) in OrderField::ALL.iter().enumerate() {
            *record.get_mut(*field) = i.to_string();
        }
        for (i, field) in OrderField::ALL.iter().enumerate() {
            assert_eq!(record.get(*field), i.to_string());
        }
        assert_eq!(record.values().count(), 12);
    }
}

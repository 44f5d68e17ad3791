use serde::{Deserialize, Serialize};

/// A single item record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

/// Partial update of an item; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none()
    }

    /// Apply the present fields to `item`
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(price) = self.price {
            item.price = price;
        }
    }
}

/// Request body for creating or fully replacing an item
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ItemRequest {
    pub name: String,
    pub price: f64,
}

/// Request body for the update-by-index operation on the collection
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateByIndexRequest {
    /// Zero-based position in ascending id order
    pub index: Option<i64>,
    pub name: Option<String>,
    pub price: Option<f64>,
}

impl UpdateByIndexRequest {
    pub fn patch(&self) -> ItemPatch {
        ItemPatch {
            name: self.name.clone(),
            price: self.price,
        }
    }
}

/// Response type for the root endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HomeResponse {
    pub message: String,
    pub items: Vec<Item>,
}

/// Response type for single-item reads
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ItemResponse {
    pub item: Item,
}

/// Response type for mutations on `/items/{id}`
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ItemMessageResponse {
    pub message: String,
    pub item: Item,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apple() -> Item {
        Item {
            id: 1,
            name: "Apple".to_string(),
            price: 1.99,
        }
    }

    #[test]
    fn test_patch_name_only_keeps_price() {
        let mut item = apple();
        ItemPatch {
            name: Some("Green Apple".to_string()),
            price: None,
        }
        .apply_to(&mut item);

        assert_eq!(item.name, "Green Apple");
        assert_eq!(item.price, 1.99);
    }

    #[test]
    fn test_patch_price_only_keeps_name() {
        let mut item = apple();
        ItemPatch {
            name: None,
            price: Some(2.49),
        }
        .apply_to(&mut item);

        assert_eq!(item.name, "Apple");
        assert_eq!(item.price, 2.49);
    }

    #[test]
    fn test_empty_patch() {
        let mut item = apple();
        let patch = ItemPatch::default();
        assert!(patch.is_empty());
        patch.apply_to(&mut item);
        assert_eq!(item, apple());
    }

    #[test]
    fn test_item_request_requires_both_fields() {
        let err = serde_json::from_str::<ItemRequest>(r#"{"name":"Apple"}"#).unwrap_err();
        assert!(err.to_string().contains("price"));

        let err = serde_json::from_str::<ItemRequest>(r#"{"name":"Apple","price":"cheap"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid type"));
    }

    #[test]
    fn test_update_by_index_request_index_optional() {
        let request: UpdateByIndexRequest = serde_json::from_str(r#"{"name":"Kiwi"}"#).unwrap();
        assert_eq!(request.index, None);
        assert_eq!(request.patch().name.as_deref(), Some("Kiwi"));
        assert_eq!(request.patch().price, None);
    }
}

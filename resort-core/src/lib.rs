use serde::{Deserialize, Serialize};

pub mod config;
pub mod seed;
pub mod store;

pub type RestaurantId = u32;

/// How many restaurants a nearby query returns at most.
pub const NEARBY_COUNT: usize = 10;
/// How many recommended ids are kept per restaurant.
pub const RECOMMENDATIONS_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodType {
    American,
    Spanish,
    Italian,
    French,
    Mexican,
    Japanese,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseLevel {
    Quiet,
    Moderate,
    Loud,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceLevel {
    Low,
    Medium,
    High,
}

/// A restaurant record as stored and served. The id is allocated by the
/// store and never changes afterwards; coordinates are always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub description: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub food_type: FoodType,
    pub noise: NoiseLevel,
    pub price: PriceLevel,
    pub family_friendly: bool,
    pub take_away: bool,
    pub rating: f32,
    pub phone: String,
}

/// A restaurant as handed to the store for insertion, before an id exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRestaurant {
    pub name: String,
    pub description: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub food_type: FoodType,
    pub noise: NoiseLevel,
    pub price: PriceLevel,
    pub family_friendly: bool,
    pub take_away: bool,
    pub rating: f32,
    pub phone: String,
}

impl NewRestaurant {
    pub fn into_restaurant(self, id: RestaurantId) -> Restaurant {
        Restaurant {
            id,
            name: self.name,
            description: self.description,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            food_type: self.food_type,
            noise: self.noise,
            price: self.price,
            family_friendly: self.family_friendly,
            take_away: self.take_away,
            rating: self.rating,
            phone: self.phone,
        }
    }
}

/// Precomputed recommendations for one restaurant, most relevant first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub restaurant_id: RestaurantId,
    pub recommended_ids: Vec<RestaurantId>,
}

/// Search index documents are addressed by a two-digit zero-padded key.
pub fn document_key(id: RestaurantId) -> String {
    format!("{:02}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_keys_are_zero_padded() {
        assert_eq!(document_key(7), "07");
        assert_eq!(document_key(42), "42");
        assert_eq!(document_key(123), "123");
    }
}

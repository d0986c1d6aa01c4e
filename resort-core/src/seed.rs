//! Sample data for a fresh store. The server runs this at startup so the API
//! is usable straight away; an already-populated store is left alone.

use crate::store::Store;
use crate::{FoodType, NewRestaurant, NoiseLevel, PriceLevel};
use anyhow::Result;
use tracing::info;

const DESCRIPTION: &str = "Family-run kitchen at the base of the mountain. Hand-cut steaks, \
     seafood, soups, baked goods and a full bar, with a kids menu in season.";
const ADDRESS: &str = "15 Ski Way, Redmond Heights, Washington, USA";

/// Inserts the sample restaurants when the store is empty. Returns how many
/// records were written (0 when the store already has data).
pub fn seed_if_empty(store: &Store) -> Result<usize> {
    if !store.is_empty() {
        return Ok(0);
    }

    let restaurants = sample_restaurants();
    let count = restaurants.len();
    for r in restaurants {
        store.insert(r)?;
    }
    info!(count, "seeded restaurant store");
    Ok(count)
}

fn sample_restaurants() -> Vec<NewRestaurant> {
    let base = |name: &str, latitude: f64, longitude: f64| -> NewRestaurant {
        NewRestaurant {
            name: name.into(),
            description: DESCRIPTION.into(),
            address: ADDRESS.into(),
            latitude,
            longitude,
            food_type: FoodType::American,
            noise: NoiseLevel::Moderate,
            price: PriceLevel::Medium,
            family_friendly: true,
            take_away: false,
            rating: 4.0,
            phone: "555-0155".into(),
        }
    };

    vec![
        NewRestaurant {
            food_type: FoodType::American,
            noise: NoiseLevel::Loud,
            price: PriceLevel::Low,
            rating: 3.0,
            take_away: true,
            ..base("Summit Cafe", 40.7218, -111.5043)
        },
        NewRestaurant {
            food_type: FoodType::Italian,
            noise: NoiseLevel::Quiet,
            price: PriceLevel::High,
            rating: 4.5,
            family_friendly: false,
            ..base("Trattoria della Neve", 40.7204, -111.5101)
        },
        NewRestaurant {
            food_type: FoodType::Spanish,
            rating: 4.2,
            ..base("La Pista Tapas", 40.7189, -111.4987)
        },
        NewRestaurant {
            food_type: FoodType::French,
            noise: NoiseLevel::Quiet,
            price: PriceLevel::High,
            rating: 4.8,
            family_friendly: false,
            ..base("Chalet Margaux", 40.7251, -111.5068)
        },
        NewRestaurant {
            food_type: FoodType::Mexican,
            noise: NoiseLevel::Loud,
            price: PriceLevel::Low,
            rating: 3.9,
            take_away: true,
            ..base("Cantina del Lifte", 40.7166, -111.5029)
        },
        NewRestaurant {
            food_type: FoodType::Japanese,
            price: PriceLevel::High,
            rating: 4.6,
            ..base("Yukiguni Sushi", 40.7231, -111.4956)
        },
        NewRestaurant {
            rating: 3.4,
            take_away: true,
            ..base("Half-Pipe Grill", 40.7195, -111.5124)
        },
        NewRestaurant {
            food_type: FoodType::Italian,
            rating: 4.1,
            ..base("Forno Alpino", 40.7172, -111.5088)
        },
        NewRestaurant {
            noise: NoiseLevel::Quiet,
            rating: 4.3,
            ..base("Base Lodge Bistro", 40.7242, -111.5011)
        },
        NewRestaurant {
            food_type: FoodType::American,
            noise: NoiseLevel::Loud,
            price: PriceLevel::Low,
            rating: 3.7,
            take_away: true,
            ..base("Powderhound Pub", 40.7157, -111.4972)
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn seeds_once_then_noops() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let first = seed_if_empty(&store).unwrap();
        assert_eq!(first, 10);
        assert_eq!(store.len(), 10);

        let second = seed_if_empty(&store).unwrap();
        assert_eq!(second, 0);
        assert_eq!(store.len(), 10);
    }

    #[test]
    fn seeded_records_have_coordinates() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        seed_if_empty(&store).unwrap();

        for id in store.ids(20).unwrap() {
            let r = store.get(id).unwrap().unwrap();
            assert!(r.latitude != 0.0 && r.longitude != 0.0);
        }
    }
}

//! The canonical restaurant store. sled keeps two trees: `restaurants` with
//! bincode-encoded records keyed by big-endian id, and `photos` with the raw
//! JPEG bytes under the same keys. Photos live apart from the records so the
//! geo scan never drags image blobs through memory.

use crate::{NewRestaurant, Restaurant, RestaurantId};
use anyhow::Result;
use std::path::Path;

const RESTAURANTS_TREE: &str = "restaurants";
const PHOTOS_TREE: &str = "photos";
const NEXT_ID_KEY: &[u8] = b"next_restaurant_id";

pub struct Store {
    db: sled::Db,
    restaurants: sled::Tree,
    photos: sled::Tree,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        let restaurants = db.open_tree(RESTAURANTS_TREE)?;
        let photos = db.open_tree(PHOTOS_TREE)?;
        Ok(Self { db, restaurants, photos })
    }

    /// Allocates the next id, persists the record under it and returns it.
    /// Ids start at 1 and are never reused.
    pub fn insert(&self, new: NewRestaurant) -> Result<RestaurantId> {
        let id = self.next_id()?;
        let restaurant = new.into_restaurant(id);
        let bytes = bincode::serialize(&restaurant)?;
        self.restaurants.insert(id.to_be_bytes(), bytes)?;
        Ok(id)
    }

    pub fn get(&self, id: RestaurantId) -> Result<Option<Restaurant>> {
        match self.restaurants.get(id.to_be_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Scans every record and returns the `count` closest to the query
    /// point, nearest first. The record set is small (tens of rows), so a
    /// full scan beats maintaining a spatial index.
    pub fn nearby(&self, latitude: f64, longitude: f64, count: usize) -> Result<Vec<Restaurant>> {
        let mut scored: Vec<(f64, Restaurant)> = Vec::new();
        for entry in self.restaurants.iter() {
            let (_, bytes) = entry?;
            let restaurant: Restaurant = bincode::deserialize(&bytes)?;
            let d = haversine_m(latitude, longitude, restaurant.latitude, restaurant.longitude);
            scored.push((d, restaurant));
        }
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored.into_iter().take(count).map(|(_, r)| r).collect())
    }

    pub fn set_photo(&self, id: RestaurantId, bytes: &[u8]) -> Result<()> {
        self.photos.insert(id.to_be_bytes(), bytes)?;
        Ok(())
    }

    pub fn photo(&self, id: RestaurantId) -> Result<Option<Vec<u8>>> {
        Ok(self.photos.get(id.to_be_bytes())?.map(|ivec| ivec.to_vec()))
    }

    /// Up to `cap` restaurant ids in ascending order. The indexing job uses
    /// this to bound its batch.
    pub fn ids(&self, cap: usize) -> Result<Vec<RestaurantId>> {
        let mut out = Vec::new();
        for entry in self.restaurants.iter() {
            let (key, _) = entry?;
            out.push(decode_id(&key));
            if out.len() == cap {
                break;
            }
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    fn next_id(&self) -> Result<RestaurantId> {
        let bytes = self.db.update_and_fetch(NEXT_ID_KEY, |old| {
            let next = old.map(|b| decode_id(b)).unwrap_or(0) + 1;
            Some(next.to_be_bytes().to_vec())
        })?;
        Ok(bytes.map(|b| decode_id(&b)).unwrap_or(1))
    }
}

fn decode_id(bytes: &[u8]) -> RestaurantId {
    RestaurantId::from_be_bytes(bytes.try_into().unwrap_or([0; 4]))
}

/// Great-circle distance in meters between two WGS84 points.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

use bson::{DateTime, doc};
use tours_collection::{CollectionConfig, MemoryCollection};

pub const TOURS: &str = "tours";

fn created(day: i64) -> DateTime {
    // 2021-01-01T00:00:00Z plus `day` days.
    DateTime::from_millis(1_609_459_200_000 + day * 86_400_000)
}

/// Five seed tours.
pub fn seed_tours() -> MemoryCollection {
    let mut tours = MemoryCollection::new(CollectionConfig::new(TOURS));
    tours.insert_many([
        doc! {
            "_id": "tour-1", "name": "The Forest Hiker", "duration": 5, "maxGroupSize": 25,
            "difficulty": "easy", "ratingsAverage": 4.7, "price": 397,
            "summary": "Breathtaking hike through the Canadian Banff National Park",
            "secretTour": false, "createdAt": created(0),
            "startLocation": { "address": "Banff, CAN" },
        },
        doc! {
            "_id": "tour-2", "name": "The Sea Explorer", "duration": 7, "maxGroupSize": 15,
            "difficulty": "medium", "ratingsAverage": 4.8, "price": 497,
            "summary": "Exploring the jaw-dropping US east coast by foot and by boat",
            "secretTour": false, "createdAt": created(1),
            "startLocation": { "address": "Miami, USA" },
        },
        doc! {
            "_id": "tour-3", "name": "The Snow Adventurer", "duration": 4, "maxGroupSize": 10,
            "difficulty": "difficult", "ratingsAverage": 4.5, "price": 997,
            "summary": "Exciting adventure in the snow with snowboarding and skiing",
            "secretTour": false, "createdAt": created(2),
            "startLocation": { "address": "Aspen, USA" },
        },
        doc! {
            "_id": "tour-4", "name": "The City Wanderer", "duration": 9, "maxGroupSize": 20,
            "difficulty": "easy", "ratingsAverage": 4.6, "price": 1197,
            "summary": "Living the life of Wanderlust in the US' most beatiful cities",
            "secretTour": false, "createdAt": created(3),
            "startLocation": { "address": "NYC, USA" },
        },
        doc! {
            "_id": "tour-5", "name": "The Park Camper", "duration": 10, "maxGroupSize": 15,
            "difficulty": "medium", "ratingsAverage": 4.9, "price": 1497,
            "summary": "Breathing in Nature in America's most spectacular National Parks",
            "secretTour": true, "createdAt": created(4),
            "startLocation": { "address": "Las Vegas, USA" },
        },
    ]);
    tours
}

pub fn names(docs: &[bson::Document]) -> Vec<&str> {
    docs.iter().map(|d| d.get_str("name").unwrap()).collect()
}

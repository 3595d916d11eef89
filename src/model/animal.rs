//! Encyclopedia entries

use crate::error::Result;
use crate::store::Document;

use super::types::EducationLevel;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Taxonomy {
    pub domain: String,
    pub kingdom: String,
    pub phylum: String,
    pub class: String,
    pub order: String,
    pub family: String,
    pub genus: String,
    pub species: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Population {
    pub past: i64,
    pub present: i64,
    pub trend: String,
}

impl Population {
    /// Percentage lost between the past and present counts, 0 when it grew
    pub fn decline_percent(&self) -> f64 {
        if self.past <= 0 || self.present >= self.past {
            return 0.0;
        }
        (self.past - self.present) as f64 * 100.0 / self.past as f64
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
    pub city: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animal {
    pub id: String,
    pub name: String,
    pub scientific_name: String,
    pub category: String,
    pub habitat: String,
    pub description: String,
    pub long_description: String,
    pub conservation_status: String,
    pub image_url: Option<String>,
    pub fun_fact: String,
    pub diet: String,
    pub lifespan: String,
    pub weight: String,
    pub length: String,
    pub special_title: String,
    pub endemic_status: String,
    pub activity_period: String,
    pub is_protected: bool,
    pub protection_type: String,
    pub size_category: String,
    pub rarity_level: String,
    pub population: Population,
    pub location: Location,
    pub taxonomy: Taxonomy,
    pub ar_model_url: Option<String>,
    pub audio_description_url: Option<String>,
    pub audio_fun_fact_url: Option<String>,
    pub tags: Vec<String>,
}

impl Animal {
    /// Decode a stored document. Absent fields take their defaults; a field
    /// holding the wrong JSON type fails the whole record.
    pub fn from_document(doc: &Document) -> Result<Self> {
        let text = |field: &str| doc.string_or_default(field);
        let optional = |field: &str| -> Result<Option<String>> {
            Ok(doc
                .get_str(field)?
                .filter(|s| !s.is_empty())
                .map(str::to_string))
        };

        Ok(Self {
            id: doc.id.clone(),
            name: text("name")?,
            scientific_name: text("scientific_name")?,
            category: text("category")?,
            habitat: text("habitat")?,
            description: text("description")?,
            long_description: text("long_description")?,
            conservation_status: text("conservation_status")?,
            image_url: optional("image_url")?,
            fun_fact: text("fun_fact")?,
            diet: text("diet")?,
            lifespan: text("lifespan")?,
            weight: text("weight")?,
            length: text("length")?,
            special_title: text("special_title")?,
            endemic_status: text("endemic_status")?,
            activity_period: text("activity_period")?,
            is_protected: doc.get_bool("is_protected")?.unwrap_or(false),
            protection_type: text("protection_type")?,
            size_category: text("size_category")?,
            rarity_level: text("rarity_level")?,
            population: Population {
                past: doc.get_i64("population_past")?.unwrap_or(0),
                present: doc.get_i64("population_present")?.unwrap_or(0),
                trend: text("population_trend")?,
            },
            location: Location {
                latitude: doc.get_f64("latitude")?.unwrap_or(0.0),
                longitude: doc.get_f64("longitude")?.unwrap_or(0.0),
                country: text("country")?,
                city: text("city")?,
            },
            taxonomy: Taxonomy {
                domain: text("domain")?,
                kingdom: text("kingdom")?,
                phylum: text("phylum")?,
                class: text("class")?,
                order: text("order")?,
                family: text("family")?,
                genus: text("genus")?,
                species: text("species")?,
            },
            ar_model_url: optional("ar_model_url")?,
            audio_description_url: optional("audio_description_url")?,
            audio_fun_fact_url: optional("audio_fun_fact_url")?,
            tags: doc.get_string_list("tags")?,
        })
    }

    /// Human readable IUCN status
    pub fn conservation_label(&self) -> &'static str {
        match self.conservation_status.as_str() {
            "EX" => "Extinct",
            "EW" => "Extinct in the Wild",
            "CR" => "Critically Endangered",
            "EN" => "Endangered",
            "VU" => "Vulnerable",
            "NT" => "Near Threatened",
            "LC" => "Least Concern",
            "DD" => "Data Deficient",
            _ => "Not Evaluated",
        }
    }

    /// Description variant for a reader: the long text from SMP upwards
    pub fn description_for(&self, level: EducationLevel) -> &str {
        if level >= EducationLevel::Smp && !self.long_description.is_empty() {
            &self.long_description
        } else {
            &self.description
        }
    }
}

/// Sections of the detail screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetailTab {
    Info,
    Population,
    Habitat,
    Taxonomy,
}

impl DetailTab {
    pub fn title(self) -> &'static str {
        match self {
            DetailTab::Info => "Info",
            DetailTab::Population => "Population",
            DetailTab::Habitat => "Habitat",
            DetailTab::Taxonomy => "Taxonomy",
        }
    }

    /// Tabs a reader at `level` may open. Elementary readers only get the
    /// info page and taxonomy is reserved for senior high.
    pub fn available_for(level: EducationLevel) -> Vec<DetailTab> {
        match level {
            EducationLevel::Sd => vec![DetailTab::Info],
            EducationLevel::Smp => vec![DetailTab::Info, DetailTab::Population, DetailTab::Habitat],
            EducationLevel::Sma => vec![
                DetailTab::Info,
                DetailTab::Population,
                DetailTab::Habitat,
                DetailTab::Taxonomy,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::{json, Value};

    fn document(id: &str, value: Value) -> Document {
        let Value::Object(fields) = value else { unreachable!() };
        Document::new(id, fields)
    }

    #[test]
    fn test_decode_full_record() {
        let doc = document(
            "komodo_dragon",
            json!({
                "name": "Komodo Dragon",
                "scientific_name": "Varanus komodoensis",
                "category": "reptile",
                "conservation_status": "EN",
                "population_past": 5000,
                "population_present": 3000,
                "population_trend": "Stable",
                "latitude": -8.5569,
                "longitude": 119.4445,
                "class": "Reptilia",
                "is_protected": true,
                "image_url": null,
                "tags": ["reptile", "endemic"]
            }),
        );
        let animal = Animal::from_document(&doc).unwrap();
        assert_eq!(animal.id, "komodo_dragon");
        assert_eq!(animal.taxonomy.class, "Reptilia");
        assert_eq!(animal.population.present, 3000);
        assert_eq!(animal.location.latitude, -8.5569);
        assert!(animal.is_protected);
        assert_eq!(animal.image_url, None);
        assert_eq!(animal.conservation_label(), "Endangered");
        assert!((animal.population.decline_percent() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_document_defaults() {
        let animal = Animal::from_document(&document("x", json!({}))).unwrap();
        assert_eq!(animal, Animal { id: "x".into(), ..Animal::default() });
    }

    #[test]
    fn test_wrong_type_fails_record() {
        let err = Animal::from_document(&document("x", json!({ "population_present": "many" })))
            .unwrap_err();
        assert!(matches!(err, Error::Malformed { ref field, .. } if field == "population_present"));
    }

    #[test]
    fn test_tabs_by_level() {
        assert_eq!(DetailTab::available_for(EducationLevel::Sd), vec![DetailTab::Info]);
        assert_eq!(DetailTab::available_for(EducationLevel::Smp).len(), 3);
        assert!(DetailTab::available_for(EducationLevel::Sma).contains(&DetailTab::Taxonomy));
    }

    #[test]
    fn test_description_variant() {
        let animal = Animal {
            description: "short".into(),
            long_description: "long".into(),
            ..Animal::default()
        };
        assert_eq!(animal.description_for(EducationLevel::Sd), "short");
        assert_eq!(animal.description_for(EducationLevel::Sma), "long");
    }
}

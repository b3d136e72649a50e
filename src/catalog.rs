//! Category catalog and query expansion.
//!
//! Each category maps to an ordered list of search templates. Expanding a
//! category for a city substitutes the city into every template, in order.
use crate::errors::AppError;

/// Placeholder that every template carries exactly once.
pub const CITY_PLACEHOLDER: &str = "{city}";

const BUILTIN_CATEGORIES: &[(&str, [&str; 5])] = &[
    (
        "Medical & Clinics",
        [
            "private medical clinic {city}",
            "specialist doctor clinic {city}",
            "dental clinic {city}",
            "pediatrician {city}",
            "diagnostic center {city}",
        ],
    ),
    (
        "Law & Consulting",
        [
            "law office {city}",
            "legal consultancy {city}",
            "corporate lawyer {city}",
            "notary public {city}",
            "tax attorney {city}",
        ],
    ),
    (
        "Real Estate & Construction",
        [
            "real estate brokerage {city}",
            "architecture office {city}",
            "construction company {city}",
            "interior design studio {city}",
            "property management {city}",
        ],
    ),
    (
        "Finance & Accounting",
        [
            "accounting firm {city}",
            "tax consultancy {city}",
            "audit firm {city}",
            "wealth management {city}",
            "insurance broker {city}",
        ],
    ),
    (
        "Education & Training",
        [
            "private school {city}",
            "training center {city}",
            "language institute {city}",
            "music school {city}",
            "vocational college {city}",
        ],
    ),
    (
        "Marketing & Media",
        [
            "digital marketing agency {city}",
            "advertising agency {city}",
            "branding consultancy {city}",
            "video production studio {city}",
            "social media agency {city}",
        ],
    ),
    (
        "Beauty & Wellness",
        [
            "beauty salon {city}",
            "spa {city}",
            "fitness center {city}",
            "yoga studio {city}",
            "hair transplant clinic {city}",
        ],
    ),
    (
        "IT & Software",
        [
            "software development company {city}",
            "web development agency {city}",
            "tech startup {city}",
            "cybersecurity firm {city}",
            "it support services {city}",
        ],
    ),
    (
        "Logistics & Transport",
        [
            "logistics company {city}",
            "freight forwarder {city}",
            "courier service {city}",
            "warehouse facility {city}",
            "moving company {city}",
        ],
    ),
    (
        "Hospitality & Food",
        [
            "restaurant {city}",
            "cafe {city}",
            "catering service {city}",
            "hotel {city}",
            "bakery {city}",
        ],
    ),
    (
        "Retail & Showrooms",
        [
            "furniture showroom {city}",
            "clothing boutique {city}",
            "jewelry store {city}",
            "electronics shop {city}",
            "optical shop {city}",
        ],
    ),
    (
        "Automotive",
        [
            "car dealership {city}",
            "auto repair shop {city}",
            "car rental agency {city}",
            "tire center {city}",
            "car detailing studio {city}",
        ],
    ),
    (
        "Solar & Green Energy",
        [
            "solar panel company {city}",
            "renewable energy firm {city}",
            "solar installation services {city}",
            "green energy solutions {city}",
            "solar inverter supplier {city}",
        ],
    ),
    (
        "E-commerce & Boutiques",
        [
            "online store {city}",
            "ecommerce business {city}",
            "fashion boutique {city}",
            "instagram shop {city}",
            "retail startup {city}",
        ],
    ),
    (
        "Insurance Agencies",
        [
            "insurance agency {city}",
            "life insurance office {city}",
            "car insurance broker {city}",
            "health insurance company {city}",
            "insurance consultancy {city}",
        ],
    ),
    (
        "Travel & Tourism",
        [
            "travel agency {city}",
            "tour operator {city}",
            "tourism office {city}",
            "holiday planner {city}",
            "visa services {city}",
        ],
    ),
    (
        "Industrial & Factories",
        [
            "manufacturing factory {city}",
            "industrial company {city}",
            "production plant {city}",
            "packaging factory {city}",
            "metal works factory {city}",
        ],
    ),
    (
        "Event Planning & Venues",
        [
            "event planning company {city}",
            "wedding venue {city}",
            "banquet hall {city}",
            "conference center {city}",
            "event organizer {city}",
        ],
    ),
    (
        "Interior Design",
        [
            "interior design studio {city}",
            "home decor company {city}",
            "office fitout firm {city}",
            "furniture design studio {city}",
            "space planning service {city}",
        ],
    ),
    (
        "Pet Care & Vets",
        [
            "veterinary clinic {city}",
            "pet shop {city}",
            "animal hospital {city}",
            "pet grooming salon {city}",
            "pet boarding service {city}",
        ],
    ),
];

/// Immutable mapping of category name to search templates.
///
/// Built once at startup and shared by reference; order of categories and
/// of templates within a category is preserved.
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    entries: Vec<(String, Vec<String>)>,
}

impl CategoryCatalog {
    /// Builds a catalog, checking that every category has at least one
    /// template and that every template contains [`CITY_PLACEHOLDER`] once.
    pub fn new<I, N, T>(entries: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (N, Vec<T>)>,
        N: Into<String>,
        T: Into<String>,
    {
        let mut catalog = Vec::new();

        for (name, templates) in entries {
            let name = name.into();
            if catalog.iter().any(|(existing, _)| existing == &name) {
                return Err(AppError::InternalError(format!(
                    "Duplicate category '{}' in catalog",
                    name
                )));
            }

            let templates: Vec<String> = templates.into_iter().map(Into::into).collect();
            if templates.is_empty() {
                return Err(AppError::InternalError(format!(
                    "Category '{}' has no query templates",
                    name
                )));
            }
            if let Some(bad) = templates
                .iter()
                .find(|t| t.matches(CITY_PLACEHOLDER).count() != 1)
            {
                return Err(AppError::InternalError(format!(
                    "Template '{}' in category '{}' must contain {} exactly once",
                    bad, name, CITY_PLACEHOLDER
                )));
            }

            catalog.push((name, templates));
        }

        Ok(Self { entries: catalog })
    }

    /// The catalog the service ships with.
    pub fn builtin() -> Result<Self, AppError> {
        Self::new(
            BUILTIN_CATEGORIES
                .iter()
                .map(|(name, templates)| (*name, templates.to_vec())),
        )
    }

    /// Category names in catalog order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn templates(&self, category: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, templates)| templates.as_slice())
    }

    /// Expands a category into concrete search queries for `city`.
    ///
    /// The city is substituted verbatim, whitespace included. Fails with
    /// [`AppError::InvalidInput`] for an unknown category or an empty city.
    pub fn expand(&self, category: &str, city: &str) -> Result<Vec<String>, AppError> {
        if city.is_empty() {
            return Err(AppError::InvalidInput("city is required".to_string()));
        }

        let templates = self.templates(category).ok_or_else(|| {
            AppError::InvalidInput(format!("unknown category '{}'", category))
        })?;

        Ok(templates
            .iter()
            .map(|template| template.replacen(CITY_PLACEHOLDER, city, 1))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = CategoryCatalog::builtin().unwrap();
        assert_eq!(catalog.categories().count(), 20);
        assert_eq!(catalog.categories().next(), Some("Medical & Clinics"));
    }

    #[test]
    fn test_expand_it_software_lisbon() {
        let catalog = CategoryCatalog::builtin().unwrap();
        let queries = catalog.expand("IT & Software", "Lisbon").unwrap();

        assert_eq!(
            queries,
            vec![
                "software development company Lisbon",
                "web development agency Lisbon",
                "tech startup Lisbon",
                "cybersecurity firm Lisbon",
                "it support services Lisbon",
            ]
        );
    }

    #[test]
    fn test_city_is_substituted_verbatim() {
        let catalog = CategoryCatalog::builtin().unwrap();
        let queries = catalog.expand("Automotive", " São Paulo & Co ").unwrap();
        assert_eq!(queries[0], "car dealership  São Paulo & Co ");
    }

    #[test]
    fn test_unknown_category_rejected() {
        let catalog = CategoryCatalog::builtin().unwrap();
        let err = catalog.expand("Underwater Basketry", "Lisbon").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_category_lookup_is_case_sensitive() {
        let catalog = CategoryCatalog::builtin().unwrap();
        assert!(catalog.expand("it & software", "Lisbon").is_err());
    }

    #[test]
    fn test_empty_city_rejected() {
        let catalog = CategoryCatalog::builtin().unwrap();
        assert!(matches!(
            catalog.expand("Automotive", ""),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_whitespace_city_is_expanded_untrimmed() {
        let catalog = CategoryCatalog::builtin().unwrap();
        let queries = catalog.expand("IT & Software", "   ").unwrap();
        assert_eq!(queries.len(), 5);
        assert_eq!(queries[0], "software development company    ");
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let result = CategoryCatalog::new(vec![("Bakeries", vec!["bakery downtown"])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_template_with_two_placeholders_rejected() {
        let result = CategoryCatalog::new(vec![("Bakeries", vec!["bakery {city} near {city}"])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let result = CategoryCatalog::new(vec![
            ("Bakeries", vec!["bakery {city}"]),
            ("Bakeries", vec!["pastry shop {city}"]),
        ]);
        assert!(result.is_err());
    }
}

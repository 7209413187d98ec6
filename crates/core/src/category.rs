//! Category registry — the support taxonomy queries are classified into.
//!
//! Categories are immutable after registry construction and keep their
//! registration order: classification tie-breaks, the discovery catalog,
//! and per-category stats all depend on that order being stable.

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Where queries landing in a category should be routed by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutePreference {
    /// Full support workflow: customer context, inference, tickets.
    #[default]
    Support,
    /// Answer directly from retrieved knowledge, no customer state.
    Knowledge,
}

/// One support category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDefinition {
    /// Unique id, e.g. "account_security"
    pub id: String,

    /// Short human-readable description
    pub description: String,

    /// Prompt template with `{query}` and `{context}` placeholders
    pub prompt_template: String,

    /// Example queries typical of this category (ordered)
    #[serde(default)]
    pub examples: Vec<String>,

    /// Keywords matched as substrings of the normalized query
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Routing hint for the agent
    #[serde(default)]
    pub route: RoutePreference,
}

/// An ordered, validated set of categories with a designated fallback.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<CategoryDefinition>,
    fallback: usize,
}

impl CategoryRegistry {
    /// Build a registry, validating id uniqueness and fallback presence.
    pub fn new(
        categories: Vec<CategoryDefinition>,
        fallback_id: &str,
    ) -> Result<Self, RegistryError> {
        if categories.is_empty() {
            return Err(RegistryError::Empty);
        }
        for (i, cat) in categories.iter().enumerate() {
            if categories[..i].iter().any(|c| c.id == cat.id) {
                return Err(RegistryError::DuplicateCategory(cat.id.clone()));
            }
        }
        let fallback = categories
            .iter()
            .position(|c| c.id == fallback_id)
            .ok_or_else(|| RegistryError::UnknownFallback(fallback_id.to_string()))?;
        Ok(Self { categories, fallback })
    }

    /// Look up a category by id.
    pub fn get(&self, id: &str) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Whether a category id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All categories in registration order.
    pub fn list(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    /// The category assigned when nothing scores.
    pub fn fallback(&self) -> &CategoryDefinition {
        &self.categories[self.fallback]
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// The built-in OmniTech support taxonomy.
    pub fn builtin() -> Self {
        let categories = vec![
            CategoryDefinition {
                id: "account_security".into(),
                description: "Account access, password resets, and security concerns".into(),
                prompt_template: concat!(
                    "You are an OmniTech support specialist handling an account security request.\n\n",
                    "Customer question: {query}\n\n",
                    "Relevant documentation:\n{context}\n\n",
                    "Walk the customer through the steps. Never ask for their current password.",
                )
                .into(),
                examples: vec![
                    "How do I reset my password?".into(),
                    "I can't log in to my account".into(),
                    "I think someone hacked my account".into(),
                    "How do I enable two-factor authentication?".into(),
                ],
                keywords: vec![
                    "password".into(),
                    "reset".into(),
                    "login".into(),
                    "account".into(),
                    "locked".into(),
                    "security".into(),
                    "authentication".into(),
                    "sign in".into(),
                    "signin".into(),
                    "log in".into(),
                    "2fa".into(),
                    "two-factor".into(),
                ],
                route: RoutePreference::Support,
            },
            CategoryDefinition {
                id: "device_troubleshooting".into(),
                description: "Device setup, malfunctions, and repair guidance".into(),
                prompt_template: concat!(
                    "You are an OmniTech support technician troubleshooting a device issue.\n\n",
                    "Customer question: {query}\n\n",
                    "Relevant documentation:\n{context}\n\n",
                    "Suggest the most likely fix first, then what to try if it fails.",
                )
                .into(),
                examples: vec![
                    "My device won't turn on".into(),
                    "The screen is frozen and nothing responds".into(),
                    "My battery drains too fast".into(),
                    "How do I factory reset my device?".into(),
                ],
                keywords: vec![
                    "won't turn on".into(),
                    "not working".into(),
                    "broken".into(),
                    "device".into(),
                    "repair".into(),
                    "troubleshoot".into(),
                    "fix".into(),
                    "error".into(),
                    "crash".into(),
                    "frozen".into(),
                    "battery".into(),
                    "charging".into(),
                    "screen".into(),
                    "power".into(),
                    "restart".into(),
                    "reboot".into(),
                ],
                route: RoutePreference::Support,
            },
            CategoryDefinition {
                id: "shipping_inquiry".into(),
                description: "Order shipping, delivery timelines, and tracking".into(),
                prompt_template: concat!(
                    "You are an OmniTech support agent answering a shipping question.\n\n",
                    "Customer question: {query}\n\n",
                    "Relevant documentation:\n{context}\n\n",
                    "Be specific about timelines and tracking steps.",
                )
                .into(),
                examples: vec![
                    "Where is my order?".into(),
                    "When will my package arrive?".into(),
                    "How do I track my shipment?".into(),
                ],
                keywords: vec![
                    "shipping".into(),
                    "delivery".into(),
                    "tracking".into(),
                    "ship".into(),
                    "arrive".into(),
                    "eta".into(),
                    "where is my".into(),
                    "transit".into(),
                    "carrier".into(),
                ],
                route: RoutePreference::Support,
            },
            CategoryDefinition {
                id: "returns_refunds".into(),
                description: "Returns, refunds, exchanges, and warranty claims".into(),
                prompt_template: concat!(
                    "You are an OmniTech support agent handling a return or refund request.\n\n",
                    "Customer question: {query}\n\n",
                    "Relevant documentation:\n{context}\n\n",
                    "State the policy clearly, including any deadlines and conditions.",
                )
                .into(),
                examples: vec![
                    "What is your return policy?".into(),
                    "I want a refund for my order".into(),
                    "My device arrived defective, can I exchange it?".into(),
                ],
                keywords: vec![
                    "return".into(),
                    "refund".into(),
                    "exchange".into(),
                    "money back".into(),
                    "warranty".into(),
                    "replacement".into(),
                    "defective".into(),
                ],
                route: RoutePreference::Support,
            },
            CategoryDefinition {
                id: "general_support".into(),
                description: "General product and company questions".into(),
                prompt_template: concat!(
                    "You are an OmniTech support agent.\n\n",
                    "Customer question: {query}\n\n",
                    "Relevant documentation:\n{context}\n\n",
                    "Answer from the documentation above.",
                )
                .into(),
                examples: vec![
                    "Tell me about OmniTech".into(),
                    "What products do you sell?".into(),
                ],
                keywords: vec![],
                route: RoutePreference::Knowledge,
            },
        ];
        // Last entry is the designated fallback.
        let fallback = categories.len() - 1;
        Self { categories, fallback }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(id: &str) -> CategoryDefinition {
        CategoryDefinition {
            id: id.into(),
            description: format!("{id} questions"),
            prompt_template: "{query} {context}".into(),
            examples: vec![],
            keywords: vec![],
            route: RoutePreference::Support,
        }
    }

    #[test]
    fn builtin_registry_is_valid() {
        let registry = CategoryRegistry::builtin();
        assert_eq!(registry.len(), 5);
        assert!(registry.contains("account_security"));
        assert_eq!(registry.fallback().id, "general_support");
        assert_eq!(registry.fallback().route, RoutePreference::Knowledge);
    }

    #[test]
    fn builtin_ids_are_unique() {
        let registry = CategoryRegistry::builtin();
        let ids: Vec<_> = registry.list().iter().map(|c| c.id.clone()).collect();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped);
    }

    #[test]
    fn new_rejects_duplicate_ids() {
        let err = CategoryRegistry::new(vec![minimal("a"), minimal("a")], "a").unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCategory(id) if id == "a"));
    }

    #[test]
    fn new_rejects_unknown_fallback() {
        let err = CategoryRegistry::new(vec![minimal("a")], "b").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownFallback(id) if id == "b"));
    }

    #[test]
    fn new_rejects_empty() {
        let err = CategoryRegistry::new(vec![], "a").unwrap_err();
        assert!(matches!(err, RegistryError::Empty));
    }

    #[test]
    fn list_preserves_registration_order() {
        let registry =
            CategoryRegistry::new(vec![minimal("z"), minimal("a"), minimal("m")], "m").unwrap();
        let ids: Vec<_> = registry.list().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }
}

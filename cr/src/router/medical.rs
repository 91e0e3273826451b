//! Medical triage router
//!
//! Five specialties: pediatria, nutrologia, psicologia, fisioterapia and a
//! default route for greetings and anything that fits none of them. Each
//! route's template is loaded by name through the [`PromptLoader`], so any of
//! them can be overridden on disk.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::{RouteDefinition, RouteTable, Router, RouterError};
use crate::llm::LlmClient;
use crate::prompts::PromptLoader;

/// Name of the triage classifier prompt
pub const CLASSIFIER_PROMPT: &str = "router";

/// The triage specialties, in the order shown to the classifier
pub fn routes() -> Vec<RouteDefinition> {
    vec![
        RouteDefinition::new(
            "pediatria",
            "Responde a perguntas sobre saúde infantil, bebês, vacinação, desenvolvimento e doenças em crianças.",
            ["filho", "bebê", "criança", "febre", "vacina"],
        ),
        RouteDefinition::new(
            "nutrologia",
            "Lida com questões de dieta, alimentação, nutrição, perda ou ganho de peso e suplementação vitamínica.",
            ["dieta", "emagrecer", "peso", "alimentação", "vitamina"],
        ),
        RouteDefinition::new(
            "psicologia",
            "Trata de consultas sobre saúde mental, ansiedade, depressão, estresse, terapia e bem-estar emocional.",
            ["ansiedade", "triste", "estresse", "terapia", "sentimentos"],
        ),
        RouteDefinition::new(
            "fisioterapia",
            "Focado em dor física, reabilitação de lesões, problemas musculares, ósseos ou de movimento.",
            ["dor", "joelho", "costas", "lesão", "torção"],
        ),
        RouteDefinition::new(
            "default",
            "Responde a saudações gerais ou perguntas que não se encaixam nas outras especialidades.",
            ["oi", "obrigado", "bom dia"],
        ),
    ]
}

pub fn route_table() -> Result<RouteTable, RouterError> {
    RouteTable::new(routes())
}

/// Build the triage router with templates resolved by `loader`
pub fn triage_router(llm: Arc<dyn LlmClient>, loader: &PromptLoader) -> Result<Router, RouterError> {
    debug!("triage_router: called");
    let table = route_table()?;
    let classifier = loader.load_template(CLASSIFIER_PROMPT)?;

    let mut templates = HashMap::new();
    for route in table.iter() {
        templates.insert(route.name().to_string(), loader.load_template(route.name())?);
    }

    Router::new(llm, table, &classifier, &templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;

    #[test]
    fn test_available_routes_in_order() {
        let llm = Arc::new(MockLlmClient::new(vec![]));
        let router = triage_router(llm, &PromptLoader::embedded_only()).unwrap();
        assert_eq!(
            router.available_routes(),
            vec!["pediatria", "nutrologia", "psicologia", "fisioterapia", "default"]
        );
    }

    #[test]
    fn test_routes_description_lists_every_specialty() {
        let llm = Arc::new(MockLlmClient::new(vec![]));
        let router = triage_router(llm, &PromptLoader::embedded_only()).unwrap();
        let lines: Vec<&str> = router.routes_description().lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("- pediatria: "));
        assert!(lines[4].starts_with("- default: "));
    }

    #[tokio::test]
    async fn test_psicologia_scenario() {
        let llm = Arc::new(MockLlmClient::with_texts(["Psicologia", "Seus sentimentos são válidos."]));
        let router = triage_router(llm.clone(), &PromptLoader::embedded_only()).unwrap();

        let result = router.route("estou ansioso").await.unwrap();
        assert_eq!(result.selected_route, "psicologia");
        assert_eq!(result.response, "Seus sentimentos são válidos.");

        let prompts = llm.prompts();
        assert!(prompts[0].contains("- psicologia: Trata de consultas sobre saúde mental"));
        assert!(prompts[0].contains("Consulta do paciente: estou ansioso"));
        assert!(prompts[1].starts_with("Você é um assistente de psicologia."));
        assert!(prompts[1].contains("Consulta: estou ansioso"));
    }

    #[tokio::test]
    async fn test_cardiologia_falls_back() {
        let llm = Arc::new(MockLlmClient::with_texts(["cardiologia", "Poderia esclarecer?"]));
        let router = triage_router(llm.clone(), &PromptLoader::embedded_only()).unwrap();

        let result = router.route("dor no peito").await.unwrap();
        assert_eq!(result.selected_route, "default");
        assert_eq!(result.unmatched_label.as_deref(), Some("cardiologia"));
        assert!(llm.prompts()[1].starts_with("Você é um assistente de triagem médica."));
    }
}

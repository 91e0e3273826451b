//! Integration tests for routing
//!
//! Drive the public router API end to end with a scripted model.

mod common;

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use chainroute::llm::LlmError;
use chainroute::prompts::PromptLoader;
use chainroute::router::{RouteDefinition, RouteTable, Router, RouterDefinition, RouterError, medical};
use common::StubLlm;
use proptest::prelude::*;
use tempfile::TempDir;

const CLASSIFIER: &str = "Rotas:\n{{routes_description}}\nEntrada: {{user_input}}";

fn triage(llm: Arc<StubLlm>) -> Router {
    medical::triage_router(llm, &PromptLoader::embedded_only()).unwrap()
}

// =============================================================================
// Medical triage scenarios
// =============================================================================

#[tokio::test]
async fn test_anxious_patient_goes_to_psicologia() {
    let llm = Arc::new(StubLlm::new(["Psicologia", "Entendo como você se sente."]));
    let result = triage(llm.clone()).route("Tenho sentido muita ansiedade").await.unwrap();

    assert_eq!(result.selected_route, "psicologia");
    assert_eq!(result.response, "Entendo como você se sente.");
    assert!(result.unmatched_label.is_none());

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 2);
    for name in ["pediatria", "nutrologia", "psicologia", "fisioterapia", "default"] {
        assert!(prompts[0].contains(&format!("- {}: ", name)), "classifier prompt lacks {}", name);
    }
    assert!(prompts[1].contains("Tenho sentido muita ansiedade"));
}

#[tokio::test]
async fn test_unknown_specialty_falls_back_to_default() {
    let llm = Arc::new(StubLlm::new(["cardiologia", "Pode dar mais detalhes?"]));
    let result = triage(llm.clone()).route("Sinto o coração acelerado").await.unwrap();

    assert_eq!(result.selected_route, "default");
    assert_eq!(result.response, "Pode dar mais detalhes?");
    assert_eq!(result.unmatched_label.as_deref(), Some("cardiologia"));
    assert!(llm.prompts()[1].starts_with("Você é um assistente de triagem médica."));
}

#[tokio::test]
async fn test_routing_is_stateless_across_calls() {
    let llm = Arc::new(StubLlm::new(["pediatria", "a", "pediatria", "b"]));
    let router = triage(llm.clone());

    let first = router.route("meu filho tem febre").await.unwrap();
    let second = router.route("meu filho tem febre").await.unwrap();

    assert_eq!(first.selected_route, second.selected_route);
    let prompts = llm.prompts();
    assert_eq!(prompts[0], prompts[2]);
    assert_eq!(prompts[1], prompts[3]);
}

#[tokio::test]
async fn test_upstream_failure_is_not_masked() {
    let llm = Arc::new(StubLlm::scripted([Err(LlmError::ApiError {
        status: 503,
        message: "overloaded".to_string(),
    })]));
    let err = triage(llm.clone()).route("oi").await.unwrap_err();

    assert!(matches!(err, RouterError::Llm(LlmError::ApiError { status: 503, .. })));
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_routes_share_one_router() {
    let llm = Arc::new(StubLlm::new(["default", "ok", "default", "ok"]));
    let router = Arc::new(triage(llm.clone()));

    let a = tokio::spawn({
        let router = router.clone();
        async move { router.route("oi").await }
    });
    let b = tokio::spawn({
        let router = router.clone();
        async move { router.route("bom dia").await }
    });

    assert_eq!(a.await.unwrap().unwrap().selected_route, "default");
    assert_eq!(b.await.unwrap().unwrap().selected_route, "default");
    assert_eq!(llm.calls(), 4);
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_route_without_template_fails_before_any_call() {
    let table = RouteTable::new(vec![
        RouteDefinition::new("ortopedia", "Ossos e articulações.", ["fratura"]),
        RouteDefinition::new("default", "Todo o resto.", ["oi"]),
    ])
    .unwrap();
    let templates: HashMap<String, String> = [("default".to_string(), "DEF {{user_input}}".to_string())].into();
    let llm = Arc::new(StubLlm::new(Vec::<String>::new()));

    let err = Router::new(llm.clone(), table, CLASSIFIER, &templates).err().unwrap();

    assert!(matches!(err, RouterError::MissingTemplate { ref route } if route == "ortopedia"));
    assert_eq!(llm.calls(), 0);
}

#[test]
fn test_table_without_default_is_rejected() {
    let err = RouteTable::new(vec![RouteDefinition::new("pediatria", "crianças", ["filho"])]).unwrap_err();
    assert!(matches!(err, RouterError::MissingDefaultRoute));
}

#[test]
fn test_available_routes_follow_configuration_order() {
    let router = triage(Arc::new(StubLlm::new(Vec::<String>::new())));
    assert_eq!(
        router.available_routes(),
        vec!["pediatria", "nutrologia", "psicologia", "fisioterapia", "default"]
    );
}

// =============================================================================
// Prompt overrides and YAML routers
// =============================================================================

#[tokio::test]
async fn test_prompt_override_on_disk_wins() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let prompts = temp_dir.path().join(".chainroute").join("prompts");
    fs::create_dir_all(&prompts).unwrap();
    fs::write(prompts.join("psicologia.pmt"), "OVERRIDE {{user_input}}").unwrap();

    let llm = Arc::new(StubLlm::new(["psicologia", "ok"]));
    let router = medical::triage_router(llm.clone(), &PromptLoader::new(temp_dir.path())).unwrap();
    router.route("triste").await.unwrap();

    assert_eq!(llm.prompts()[1], "OVERRIDE triste");
}

#[tokio::test]
async fn test_yaml_router_end_to_end() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("suporte.yml");
    fs::write(
        &path,
        r#"
name: suporte
classifier-template: "{{routes_description}}|{{user_input}}"
routes:
  - name: faturamento
    description: Boletos.
    template: "FIN {{user_input}}"
  - name: default
    description: Resto.
    template: "DEF {{user_input}}"
"#,
    )
    .unwrap();

    let llm = Arc::new(StubLlm::new(["suporte tecnico", "Encaminhado."]));
    let router = RouterDefinition::load(&path)
        .unwrap()
        .build(llm.clone(), &PromptLoader::embedded_only())
        .unwrap();
    let result = router.route("minha internet caiu").await.unwrap();

    assert_eq!(result.selected_route, "default");
    assert_eq!(result.unmatched_label.as_deref(), Some("suporte tecnico"));
    assert_eq!(llm.prompts()[0], "- faturamento: Boletos.\n- default: Resto.|minha internet caiu");
    assert_eq!(llm.prompts()[1], "DEF minha internet caiu");
}

// =============================================================================
// Label normalization properties
// =============================================================================

fn with_case(name: &str, mask: &[bool]) -> String {
    name.chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c })
        .collect()
}

proptest! {
    #[test]
    fn prop_case_and_whitespace_variants_resolve_to_the_route(
        idx in 0usize..5,
        mask in prop::collection::vec(any::<bool>(), 1..8),
        left in "[ \t\n]{0,3}",
        right in "[ \t\n]{0,3}",
    ) {
        let router = triage(Arc::new(StubLlm::new(Vec::<String>::new())));
        let names = router.available_routes();
        let label = format!("{}{}{}", left, with_case(&names[idx], &mask), right);

        let selection = router.resolve_route(&label);
        prop_assert_eq!(&selection.route, &names[idx]);
        prop_assert!(!selection.fell_back());
    }

    #[test]
    fn prop_unknown_labels_fall_back_to_default(label in "[a-z]{1,12}") {
        let router = triage(Arc::new(StubLlm::new(Vec::<String>::new())));
        prop_assume!(!router.routes().contains(&label));

        let selection = router.resolve_route(&label);
        prop_assert_eq!(selection.route.as_str(), "default");
        prop_assert_eq!(selection.unmatched_label.as_deref(), Some(label.as_str()));
    }
}

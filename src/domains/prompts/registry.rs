//! Prompt Registry - central registration of all prompts.
//!
//! This module provides dynamic prompt registration without modifying service.rs.
//! When adding a new prompt:
//! 1. Create the prompt file in `definitions/`
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it here in `get_all_prompts()`

use super::definitions::{
    CompanyAnalysisPrompt, EconomicIndicatorAnalysisPrompt, FinancialStatementAnalysisPrompt,
    InvestmentIdeaGenerationPrompt, MarketOutlookPrompt, PromptDefinition, StockComparisonPrompt,
    TechnicalAnalysisPrompt,
};
use super::templates::PromptTemplate;

/// Build a PromptTemplate from a PromptDefinition.
fn build_template<P: PromptDefinition>() -> PromptTemplate {
    PromptTemplate {
        name: P::NAME.to_string(),
        description: Some(P::DESCRIPTION.to_string()),
        arguments: P::arguments(),
        template: P::template().to_string(),
    }
}

/// Get all registered prompts as PromptTemplates.
///
/// This is the central place where all prompts are registered.
/// When adding a new prompt, add it here.
pub fn get_all_prompts() -> Vec<PromptTemplate> {
    vec![
        build_template::<CompanyAnalysisPrompt>(),
        build_template::<FinancialStatementAnalysisPrompt>(),
        build_template::<StockComparisonPrompt>(),
        build_template::<MarketOutlookPrompt>(),
        build_template::<InvestmentIdeaGenerationPrompt>(),
        build_template::<TechnicalAnalysisPrompt>(),
        build_template::<EconomicIndicatorAnalysisPrompt>(),
    ]
}

/// Get the list of all prompt names.
pub fn prompt_names() -> Vec<&'static str> {
    vec![
        CompanyAnalysisPrompt::NAME,
        FinancialStatementAnalysisPrompt::NAME,
        StockComparisonPrompt::NAME,
        MarketOutlookPrompt::NAME,
        InvestmentIdeaGenerationPrompt::NAME,
        TechnicalAnalysisPrompt::NAME,
        EconomicIndicatorAnalysisPrompt::NAME,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_all_prompts() {
        let prompts = get_all_prompts();
        assert_eq!(prompts.len(), 7);

        let names: Vec<_> = prompts.iter().map(|p| p.name.as_str()).collect();
        assert!(names.contains(&"company_analysis"));
        assert!(names.contains(&"financial_statement_analysis"));
        assert!(names.contains(&"stock_comparison"));
        assert!(names.contains(&"market_outlook"));
        assert!(names.contains(&"investment_idea_generation"));
        assert!(names.contains(&"technical_analysis"));
        assert!(names.contains(&"economic_indicator_analysis"));
    }

    #[test]
    fn test_prompt_names_match_templates() {
        let names = prompt_names();
        let prompts = get_all_prompts();
        assert_eq!(names.len(), prompts.len());
        for template in &prompts {
            assert!(names.contains(&template.name.as_str()));
        }
    }
}

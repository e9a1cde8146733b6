//! Declarative probability statements over named model symbols.
//!
//! A model is a list of statements, each binding a target symbol (possibly
//! indexed over a range) either to a distribution or to a deterministic
//! expression of other symbols. The list carries no executable code, so any
//! sampling backend can translate it into its own modelling language.

use serde::{Deserialize, Serialize};

use crate::prior::Prior;

/// Upper bound of an index range: a literal or a data symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    /// A fixed size.
    Const(usize),
    /// The value of a data symbol such as `N`.
    Symbol(String),
}

/// A loop index `name in 1..=upper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    /// Index variable name.
    pub name: String,
    /// Inclusive upper bound.
    pub upper: Bound,
}

impl Index {
    /// Index over `1..=upper` for a data symbol.
    pub fn over(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            upper: Bound::Symbol(symbol.to_string()),
        }
    }

    /// Index over `1..=n`.
    pub fn fixed(name: &str, n: usize) -> Self {
        Self {
            name: name.to_string(),
            upper: Bound::Const(n),
        }
    }
}

/// Reference to a probability vector, optionally one row of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbsRef {
    /// Symbol holding the probabilities.
    pub symbol: String,
    /// Row selector, e.g. `z[i]`, when the symbol is a table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<String>,
}

/// Distribution on the right-hand side of a stochastic statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    /// A parameter prior.
    Prior(Prior),
    /// Categorical over codes `1..=len(probs)`.
    Categorical(ProbsRef),
}

/// Deterministic expression on the right-hand side of a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expression {
    /// Multinomial-logit link with reference weight 1 for state 1.
    SoftmaxWithReference {
        /// Symbol of the free parameters.
        params: String,
    },
    /// State-by-observation detection table built from per-species detection probabilities.
    DetectionTable {
        /// Symbol of the detection probabilities.
        detection: String,
        /// Number of species.
        n_species: usize,
    },
}

/// One line of the generative model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    /// `target[indices] ~ distribution`
    Stochastic {
        /// Target symbol.
        target: String,
        /// Loop indices applied to the target.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        indices: Vec<Index>,
        /// Right-hand side.
        distribution: Distribution,
    },
    /// `target <- expression`
    Deterministic {
        /// Target symbol.
        target: String,
        /// Right-hand side.
        expression: Expression,
    },
}

impl Statement {
    /// Target symbol of this statement.
    pub fn target(&self) -> &str {
        match self {
            Self::Stochastic { target, .. } | Self::Deterministic { target, .. } => target,
        }
    }
}

/// Statements of the two-level occupancy model for `n_species` species.
///
/// Symbols: `beta` (link parameters), `psi` (state probabilities), `p`
/// (detection probabilities), `obs_prob` (detection table), `z` (latent
/// states), `y` (observations), and the data sizes `N` and `J`.
pub fn occupancy_statements(n_species: usize, link_prior: Prior, detection_prior: Prior) -> Vec<Statement> {
    let n_states = 1usize << n_species;
    vec![
        Statement::Stochastic {
            target: "beta".to_string(),
            indices: vec![Index::fixed("k", n_states - 1)],
            distribution: Distribution::Prior(link_prior),
        },
        Statement::Deterministic {
            target: "psi".to_string(),
            expression: Expression::SoftmaxWithReference {
                params: "beta".to_string(),
            },
        },
        Statement::Stochastic {
            target: "p".to_string(),
            indices: vec![Index::fixed("s", n_species)],
            distribution: Distribution::Prior(detection_prior),
        },
        Statement::Deterministic {
            target: "obs_prob".to_string(),
            expression: Expression::DetectionTable {
                detection: "p".to_string(),
                n_species,
            },
        },
        Statement::Stochastic {
            target: "z".to_string(),
            indices: vec![Index::over("i", "N")],
            distribution: Distribution::Categorical(ProbsRef {
                symbol: "psi".to_string(),
                row: None,
            }),
        },
        Statement::Stochastic {
            target: "y".to_string(),
            indices: vec![Index::over("i", "N"), Index::over("j", "J")],
            distribution: Distribution::Categorical(ProbsRef {
                symbol: "obs_prob".to_string(),
                row: Some("z[i]".to_string()),
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_species_statement_order() {
        let stmts = occupancy_statements(2, Prior::standard_normal(), Prior::unit_uniform());
        let targets: Vec<&str> = stmts.iter().map(Statement::target).collect();
        assert_eq!(targets, vec!["beta", "psi", "p", "obs_prob", "z", "y"]);
        match &stmts[0] {
            Statement::Stochastic { indices, .. } => {
                assert_eq!(indices, &vec![Index::fixed("k", 3)]);
            }
            other => panic!("expected stochastic beta, got {other:?}"),
        }
    }

    #[test]
    fn observation_statement_json() {
        let stmts = occupancy_statements(2, Prior::standard_normal(), Prior::unit_uniform());
        let json = serde_json::to_value(&stmts[5]).unwrap();
        assert_eq!(json["kind"], "stochastic");
        assert_eq!(json["target"], "y");
        assert_eq!(json["indices"][1]["upper"], "J");
        assert_eq!(json["distribution"]["categorical"]["symbol"], "obs_prob");
        assert_eq!(json["distribution"]["categorical"]["row"], "z[i]");
    }

    #[test]
    fn statements_round_trip_through_json() {
        let stmts = occupancy_statements(3, Prior::standard_normal(), Prior::unit_uniform());
        let json = serde_json::to_string(&stmts).unwrap();
        let back: Vec<Statement> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stmts);
    }
}

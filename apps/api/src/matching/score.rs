//! Match Score Calculator — capability vs requirement fit, 0–100.
//!
//! Algorithm (default weights sum to 100):
//! 1. Identity gate: app, technology and role must all be equal, else 0.
//!    A match earns `exact_match` (40).
//! 2. Proficiency (30): full on equal rank; overqualification loses 10% per
//!    rank of excess, underqualification loses 30% per rank of gap.
//! 3. Experience (20): full when no minimum is set or it is met exactly;
//!    surplus years decay 5% each up to 5 years, missing years cost 15% each.
//! 4. Primary bonus (10): full for the primary capability, 70% otherwise.
//! 5. Round to nearest integer, clamp to [0, 100].
//!
//! Pure functions only. A 0 score is a defined non-match, not a failure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::capability::{Capability, ProficiencyLevel, Requirement};

/// Ranking threshold used when the caller gives none.
pub const DEFAULT_MIN_SCORE: u32 = 60;

/// Immutable weighting for the calculator. The four headline weights are
/// expected to sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub exact_match: f64,
    pub proficiency: f64,
    pub experience: f64,
    pub primary_bonus: f64,
    /// Fraction of `proficiency` lost per rank above the requirement.
    pub overqualification_step: f64,
    /// Fraction of `proficiency` lost per rank below the requirement.
    pub underqualification_step: f64,
    /// Fraction of `experience` lost per surplus year.
    pub experience_surplus_step: f64,
    /// Surplus years beyond this stop decaying the score.
    pub experience_surplus_cap: f64,
    /// Fraction of `experience` lost per missing year.
    pub experience_gap_step: f64,
    /// Share of `primary_bonus` a secondary capability still earns.
    pub secondary_ratio: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            exact_match: 40.0,
            proficiency: 30.0,
            experience: 20.0,
            primary_bonus: 10.0,
            overqualification_step: 0.1,
            underqualification_step: 0.3,
            experience_surplus_step: 0.05,
            experience_surplus_cap: 5.0,
            experience_gap_step: 0.15,
            secondary_ratio: 0.7,
        }
    }
}

impl MatchWeights {
    pub fn total(&self) -> f64 {
        self.exact_match + self.proficiency + self.experience + self.primary_bonus
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Single-pair scoring
// ────────────────────────────────────────────────────────────────────────────

pub fn identity_matches(capability: &Capability, requirement: &Requirement) -> bool {
    capability.app_id == requirement.app_id
        && capability.technology_id == requirement.technology_id
        && capability.role_id == requirement.role_id
}

/// Scores one capability against one requirement.
pub fn score(capability: &Capability, requirement: &Requirement, weights: &MatchWeights) -> u32 {
    if !identity_matches(capability, requirement) {
        return 0;
    }

    let total = weights.exact_match
        + proficiency_term(
            capability.proficiency_level,
            requirement.proficiency_level,
            weights,
        )
        + experience_term(
            capability.years_of_experience,
            requirement.min_years_exp,
            weights,
        )
        + primary_term(capability.is_primary, weights);

    total.round().clamp(0.0, 100.0) as u32
}

fn proficiency_term(have: ProficiencyLevel, want: ProficiencyLevel, w: &MatchWeights) -> f64 {
    let diff = have.rank() - want.rank();
    let factor = if diff > 0 {
        1.0 - w.overqualification_step * diff as f64
    } else {
        1.0 - w.underqualification_step * (-diff) as f64
    };
    w.proficiency * factor.max(0.0)
}

fn experience_term(years: Option<f64>, min_years: Option<f64>, w: &MatchWeights) -> f64 {
    let Some(min_years) = min_years else {
        return w.experience;
    };
    let years = years.unwrap_or(0.0);

    let factor = if years > min_years {
        let surplus = (years - min_years).min(w.experience_surplus_cap);
        1.0 - w.experience_surplus_step * surplus
    } else {
        1.0 - w.experience_gap_step * (min_years - years)
    };
    w.experience * factor.max(0.0)
}

fn primary_term(is_primary: bool, w: &MatchWeights) -> f64 {
    if is_primary {
        w.primary_bonus
    } else {
        w.primary_bonus * w.secondary_ratio
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bulk ranking
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub capability: Capability,
    pub score: u32,
}

/// Scores every candidate, drops those under `min_score` and sorts the rest
/// best-first. The sort is stable, so equal scores keep input order.
pub fn rank_candidates(
    requirement: &Requirement,
    candidates: Vec<Capability>,
    weights: &MatchWeights,
    min_score: u32,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .map(|capability| RankedCandidate {
            score: score(&capability, requirement, weights),
            capability,
        })
        .filter(|c| c.score >= min_score)
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// The best capability/requirement pairing for one resource on one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequirementMatch {
    pub requirement_id: Uuid,
    pub capability_id: Uuid,
    pub score: u32,
}

/// Pairs every capability with every requirement and keeps the highest
/// score. The first pair wins ties. `None` when either side is empty.
pub fn best_requirement_match(
    capabilities: &[Capability],
    requirements: &[Requirement],
    weights: &MatchWeights,
) -> Option<RequirementMatch> {
    let mut best: Option<RequirementMatch> = None;
    for requirement in requirements {
        for capability in capabilities {
            let s = score(capability, requirement, weights);
            if best.map_or(true, |b| s > b.score) {
                best = Some(RequirementMatch {
                    requirement_id: requirement.id,
                    capability_id: capability.id,
                    score: s,
                });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::capability::ProficiencyLevel::*;

    struct Identity {
        app_id: Uuid,
        technology_id: Uuid,
        role_id: Uuid,
    }

    fn identity() -> Identity {
        Identity {
            app_id: Uuid::new_v4(),
            technology_id: Uuid::new_v4(),
            role_id: Uuid::new_v4(),
        }
    }

    fn capability(
        id: &Identity,
        level: ProficiencyLevel,
        years: Option<f64>,
        is_primary: bool,
    ) -> Capability {
        Capability {
            id: Uuid::new_v4(),
            resource_id: Uuid::new_v4(),
            app_id: id.app_id,
            technology_id: id.technology_id,
            role_id: id.role_id,
            proficiency_level: level,
            years_of_experience: years,
            is_primary,
        }
    }

    fn requirement(id: &Identity, level: ProficiencyLevel, min_years: Option<f64>) -> Requirement {
        Requirement {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            app_id: id.app_id,
            technology_id: id.technology_id,
            role_id: id.role_id,
            proficiency_level: level,
            min_years_exp: min_years,
            required_count: 1,
            fulfilled_count: 0,
        }
    }

    #[test]
    fn test_perfect_match_scores_100() {
        let id = identity();
        let w = MatchWeights::default();
        let cap = capability(&id, Advanced, Some(5.0), true);
        let req = requirement(&id, Advanced, Some(5.0));
        assert_eq!(score(&cap, &req, &w), 100);
    }

    #[test]
    fn test_secondary_capability_gets_70_percent_bonus() {
        let id = identity();
        let w = MatchWeights::default();
        let cap = capability(&id, Advanced, None, false);
        let req = requirement(&id, Advanced, None);
        assert_eq!(score(&cap, &req, &w), 97);
    }

    #[test]
    fn test_overqualification_small_penalty() {
        let id = identity();
        let w = MatchWeights::default();
        // 40 + 30*0.7 + 20 + 7
        let cap = capability(&id, Expert, None, false);
        let req = requirement(&id, Beginner, None);
        assert_eq!(score(&cap, &req, &w), 88);
    }

    #[test]
    fn test_underqualification_steep_penalty() {
        let id = identity();
        let w = MatchWeights::default();
        // 40 + 30*0.7 + 20*0.7 + 10
        let cap = capability(&id, Intermediate, Some(3.0), true);
        let req = requirement(&id, Advanced, Some(5.0));
        assert_eq!(score(&cap, &req, &w), 85);
    }

    #[test]
    fn test_experience_surplus_decays() {
        let id = identity();
        let w = MatchWeights::default();
        // 40 + 30*0.9 + 20*0.85 + 10
        let cap = capability(&id, Expert, Some(8.0), true);
        let req = requirement(&id, Advanced, Some(5.0));
        assert_eq!(score(&cap, &req, &w), 94);
    }

    #[test]
    fn test_missing_years_treated_as_zero() {
        let id = identity();
        let w = MatchWeights::default();
        let req = requirement(&id, Advanced, Some(10.0));
        let none = capability(&id, Advanced, None, true);
        let zero = capability(&id, Advanced, Some(0.0), true);
        assert_eq!(score(&none, &req, &w), score(&zero, &req, &w));
        // experience term bottoms out at 0
        assert_eq!(score(&none, &req, &w), 80);
    }

    #[test]
    fn test_identity_gate_returns_zero() {
        let id = identity();
        let w = MatchWeights::default();
        let req = requirement(&id, Beginner, None);

        let mut other_app = capability(&id, Expert, Some(20.0), true);
        other_app.app_id = Uuid::new_v4();
        let mut other_tech = capability(&id, Expert, Some(20.0), true);
        other_tech.technology_id = Uuid::new_v4();
        let mut other_role = capability(&id, Expert, Some(20.0), true);
        other_role.role_id = Uuid::new_v4();

        for cap in [other_app, other_tech, other_role] {
            assert_eq!(score(&cap, &req, &w), 0);
        }
    }

    #[test]
    fn test_score_always_within_bounds() {
        let id = identity();
        let w = MatchWeights::default();
        let years = [None, Some(0.0), Some(1.5), Some(5.0), Some(12.0), Some(40.0)];
        let mins = [None, Some(0.0), Some(3.0), Some(7.0), Some(25.0)];
        for have in ProficiencyLevel::ALL {
            for want in ProficiencyLevel::ALL {
                for y in years {
                    for m in mins {
                        for primary in [true, false] {
                            let s = score(
                                &capability(&id, have, y, primary),
                                &requirement(&id, want, m),
                                &w,
                            );
                            assert!(s <= 100, "{have} vs {want}, {y:?}/{m:?}: {s}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_exact_proficiency_never_worse_than_mismatch() {
        let id = identity();
        let w = MatchWeights::default();
        for x in ProficiencyLevel::ALL {
            let cap = capability(&id, x, Some(4.0), false);
            let exact = score(&cap, &requirement(&id, x, Some(4.0)), &w);
            for y in ProficiencyLevel::ALL.into_iter().filter(|y| *y != x) {
                let other = score(&cap, &requirement(&id, y, Some(4.0)), &w);
                assert!(exact >= other, "{x} exact {exact} < vs {y} {other}");
            }
        }
    }

    #[test]
    fn test_experience_monotone_up_to_minimum_and_flat_past_cap() {
        let id = identity();
        let w = MatchWeights::default();
        let req = requirement(&id, Advanced, Some(6.0));

        let mut previous = 0;
        for y in 0..=6 {
            let s = score(&capability(&id, Advanced, Some(y as f64), true), &req, &w);
            assert!(s >= previous, "score dropped at {y} years");
            previous = s;
        }

        let at_cap = score(&capability(&id, Advanced, Some(11.0), true), &req, &w);
        for y in 12..30 {
            let s = score(&capability(&id, Advanced, Some(y as f64), true), &req, &w);
            assert_eq!(s, at_cap, "score changed at {y} years");
        }
    }

    #[test]
    fn test_custom_weights_flow_through() {
        let id = identity();
        let w = MatchWeights {
            exact_match: 70.0,
            proficiency: 10.0,
            experience: 10.0,
            primary_bonus: 10.0,
            ..MatchWeights::default()
        };
        let cap = capability(&id, Beginner, None, true);
        let req = requirement(&id, Expert, None);
        // 70 + 10*max(0, 1-0.9) + 10 + 10
        assert_eq!(score(&cap, &req, &w), 91);
        assert_eq!(w.total(), 100.0);
    }

    #[test]
    fn test_rank_filters_and_sorts_descending() {
        let id = identity();
        let w = MatchWeights::default();
        let req = requirement(&id, Advanced, Some(5.0));

        let weak = capability(&id, Beginner, Some(0.0), false); // 40 + 12 + 5 + 7 = 64
        let strong = capability(&id, Advanced, Some(5.0), true); // 100
        let mut foreign = capability(&id, Advanced, Some(5.0), true);
        foreign.role_id = Uuid::new_v4();
        let middling = capability(&id, Intermediate, Some(4.0), false); // 40 + 21 + 17 + 7 = 85

        let ranked = rank_candidates(
            &req,
            vec![weak.clone(), strong.clone(), foreign, middling.clone()],
            &w,
            DEFAULT_MIN_SCORE,
        );
        let ids: Vec<Uuid> = ranked.iter().map(|r| r.capability.id).collect();
        assert_eq!(ids, vec![strong.id, middling.id, weak.id]);
        let scores: Vec<u32> = ranked.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![100, 85, 64]);
    }

    #[test]
    fn test_rank_keeps_input_order_on_ties() {
        let id = identity();
        let w = MatchWeights::default();
        let req = requirement(&id, Advanced, None);
        let first = capability(&id, Advanced, None, true);
        let second = capability(&id, Advanced, None, true);
        let third = capability(&id, Advanced, None, true);

        let ranked = rank_candidates(
            &req,
            vec![first.clone(), second.clone(), third.clone()],
            &w,
            0,
        );
        let ids: Vec<Uuid> = ranked.iter().map(|r| r.capability.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[test]
    fn test_best_requirement_match_picks_highest() {
        let id = identity();
        let other = identity();
        let w = MatchWeights::default();
        let cap_main = capability(&id, Advanced, Some(5.0), true);
        let cap_side = capability(&other, Beginner, None, false);
        let req_main = requirement(&id, Expert, Some(5.0));
        let req_side = requirement(&other, Beginner, None);

        let best = best_requirement_match(
            &[cap_main.clone(), cap_side.clone()],
            &[req_main, req_side.clone()],
            &w,
        )
        .unwrap();
        assert_eq!(best.requirement_id, req_side.id);
        assert_eq!(best.capability_id, cap_side.id);
        assert_eq!(best.score, 97);
    }

    #[test]
    fn test_best_requirement_match_empty_inputs() {
        let id = identity();
        let w = MatchWeights::default();
        let cap = capability(&id, Advanced, None, true);
        assert!(best_requirement_match(&[cap], &[], &w).is_none());
        assert!(best_requirement_match(&[], &[requirement(&id, Advanced, None)], &w).is_none());
    }
}

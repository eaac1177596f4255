//! Folding several per-method verdicts into one.

use crate::{
    check::Check,
    types::{Availability, ErrorPolicy, VerdictRule},
};
use futures::future::join_all;
use std::sync::Arc;

pub async fn combine(checks: &[Arc<dyn Check>], rule: VerdictRule, domain: &str) -> Availability {
    match rule {
        VerdictRule::AnyTaken => any_taken(checks, domain).await,
        VerdictRule::Majority => {
            let verdicts = join_all(checks.iter().map(|c| c.check(domain))).await;
            majority(&verdicts)
        }
    }
}

/// Runs checks in order and stops at the first one that sees the name in use.
async fn any_taken(checks: &[Arc<dyn Check>], domain: &str) -> Availability {
    let mut saw_available = false;
    let mut inconclusive = None;

    for check in checks {
        match check.check(domain).await {
            Availability::Taken => return Availability::Taken,
            Availability::Available => saw_available = true,
            other => inconclusive = Some(other),
        }
    }

    if saw_available {
        Availability::Available
    } else {
        inconclusive.unwrap_or_else(|| Availability::unknown("No probe methods configured"))
    }
}

pub fn majority(verdicts: &[Availability]) -> Availability {
    let taken = verdicts.iter().filter(|v| v.is_taken()).count();
    let available = verdicts.iter().filter(|v| v.is_available()).count();

    if taken > available {
        Availability::Taken
    } else if available > taken {
        Availability::Available
    } else if taken > 0 {
        Availability::unknown("Split vote")
    } else {
        verdicts
            .iter()
            .find(|v| !v.is_conclusive())
            .cloned()
            .unwrap_or_else(|| Availability::unknown("No probe methods configured"))
    }
}

/// Reports probe failures the way the caller asked for.
pub fn apply_policy(availability: Availability, policy: ErrorPolicy) -> Availability {
    match (availability, policy) {
        (Availability::Error { .. }, ErrorPolicy::Available) => Availability::Available,
        (other, _) => other,
    }
}

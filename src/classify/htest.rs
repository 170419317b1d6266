//! Statistics of well-known hypothesis tests, keyed by the test's description.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::domain::Statistic;

const TESTS: &[(&str, Option<Statistic>)] = &[
    ("One Sample t-test", Some(Statistic::T)),
    ("Two Sample t-test", Some(Statistic::T)),
    ("Welch Two Sample t-test", Some(Statistic::T)),
    ("Paired t-test", Some(Statistic::T)),
    ("Pearson's product-moment correlation", Some(Statistic::T)),
    ("Pearson's Chi-squared test", Some(Statistic::ChiSquared)),
    (
        "Pearson's Chi-squared test with Yates' continuity correction",
        Some(Statistic::ChiSquared),
    ),
    (
        "Chi-squared test for given probabilities",
        Some(Statistic::ChiSquared),
    ),
    ("McNemar's Chi-squared test", Some(Statistic::ChiSquared)),
    (
        "McNemar's Chi-squared test with continuity correction",
        Some(Statistic::ChiSquared),
    ),
    ("Kruskal-Wallis rank sum test", Some(Statistic::ChiSquared)),
    ("Friedman rank sum test", Some(Statistic::ChiSquared)),
    ("Bartlett test of homogeneity of variances", Some(Statistic::ChiSquared)),
    ("Mantel-Haenszel chi-squared test", Some(Statistic::ChiSquared)),
    (
        "Mantel-Haenszel chi-squared test with continuity correction",
        Some(Statistic::ChiSquared),
    ),
    (
        "Fligner-Killeen test of homogeneity of variances",
        Some(Statistic::ChiSquared),
    ),
    (
        "1-sample proportions test with continuity correction",
        Some(Statistic::ChiSquared),
    ),
    (
        "1-sample proportions test without continuity correction",
        Some(Statistic::ChiSquared),
    ),
    (
        "2-sample test for equality of proportions with continuity correction",
        Some(Statistic::ChiSquared),
    ),
    (
        "2-sample test for equality of proportions without continuity correction",
        Some(Statistic::ChiSquared),
    ),
    ("F test to compare two variances", Some(Statistic::F)),
    ("One-way analysis of means", Some(Statistic::F)),
    (
        "One-way analysis of means (not assuming equal variances)",
        Some(Statistic::F),
    ),
    ("Fisher's Exact Test for Count Data", None),
    ("Exact binomial test", None),
    ("Wilcoxon signed rank test", None),
    ("Wilcoxon signed rank exact test", None),
    ("Wilcoxon signed rank test with continuity correction", None),
    ("Wilcoxon rank sum test", None),
    ("Wilcoxon rank sum exact test", None),
    ("Wilcoxon rank sum test with continuity correction", None),
];

static BY_DESCRIPTION: Lazy<HashMap<&'static str, Option<Statistic>>> =
    Lazy::new(|| TESTS.iter().copied().collect());

/// Look a test description up. The outer `None` means "not a known test";
/// `Some(None)` is a known test without a usable statistic.
pub(crate) fn lookup(description: &str) -> Option<Option<Statistic>> {
    BY_DESCRIPTION.get(description.trim()).copied()
}

//! Static type registry: back-end type tag → statistic bucket.
//!
//! The lists below are the source of truth; `BUCKETS` is built from them once.
//! Apart from the tweedie set (a pre-check, not a bucket) no tag appears in
//! more than one list.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::domain::Statistic;

/// Models whose statistic is `t` whatever their type tag says.
pub(crate) const TWEEDIE: &[&str] = &["cpglm", "cpglmm", "zcpglm", "bcplm"];

pub(crate) const UNSUPPORTED: &[&str] = &[
    "BFBayesFactor",
    "bamlss",
    "bayesx",
    "BBmm",
    "bcplm",
    "blavaan",
    "brmsfit",
    "cpglm",
    "cpglmm",
    "gbm",
    "joint",
    "MCMCglmm",
    "mcmc",
    "mcmc.list",
    "mediate",
    "rjags",
    "runjags",
    "sim",
    "sim.merMod",
    "stanfit",
    "stanmvreg",
    "stanreg",
    "survfit",
    "zcpglm",
    "bayesQR",
    "bmlm",
];

pub(crate) const T_STATISTIC: &[&str] = &[
    "lm",
    "biglm",
    "complmrob",
    "crq",
    "drc",
    "elm",
    "feis",
    "felm",
    "gls",
    "gmm",
    "gnls",
    "HLfit",
    "ivreg",
    "ivFixed",
    "iv_robust",
    "lm_robust",
    "lm.beta",
    "lmerMod",
    "lmerModLmerTest",
    "lme",
    "lmrob",
    "lmRob",
    "lqm",
    "lqmm",
    "mixed",
    "mlm",
    "nlmerMod",
    "nlrq",
    "nls",
    "ols",
    "orcutt",
    "plm",
    "rlm",
    "rlmerMod",
    "rq",
    "rqs",
    "rqss",
    "speedlm",
    "summary.lm",
    "svyolr",
    "truncreg",
    "wblm",
];

pub(crate) const Z_STATISTIC: &[&str] = &[
    "Arima",
    "averaging",
    "betareg",
    "betamfx",
    "bife",
    "bracl",
    "brglm",
    "brmultinom",
    "btergm",
    "censReg",
    "clm",
    "clm2",
    "clmm",
    "clmm2",
    "coxme",
    "coxph",
    "coxr",
    "crch",
    "crr",
    "DirichletRegModel",
    "ergm",
    "feglm",
    "flexsurvreg",
    "gee",
    "glimML",
    "glmmadmb",
    "glmmLasso",
    "glmmTMB",
    "glmx",
    "gmnl",
    "hurdle",
    "lavaan",
    "logitmfx",
    "logitor",
    "LORgee",
    "lrm",
    "margins",
    "metaplus",
    "mixor",
    "MixMod",
    "mjoint",
    "mle",
    "mle2",
    "mlogit",
    "mclogit",
    "mvmeta",
    "mvord",
    "negbin",
    "negbinmfx",
    "nlreg",
    "orm",
    "poissonmfx",
    "probitmfx",
    "psm",
    "Rchoice",
    "riskRegression",
    "rma",
    "rma.mv",
    "rma.uni",
    "Sarlm",
    "sem",
    "survreg",
    "svy_vglm",
    "tobit",
    "vglm",
    "wbgee",
    "zeroinfl",
    "zerotrunc",
];

pub(crate) const F_STATISTIC: &[&str] = &[
    "aov",
    "aovlist",
    "anova",
    "Anova.mlm",
    "manova",
    "maov",
    "summary.aov",
    "afex_aov",
    "Gam",
];

pub(crate) const CHI_SQUARED: &[&str] = &["coxph.penal", "vgam", "loglm"];

/// Statistic depends on the fitted family (or on the degrees of freedom).
pub(crate) const MIXED_BAG: &[&str] = &[
    "glm", "glmRob", "glmrob", "bigglm", "speedglm", "svyglm", "emmGrid", "emm_list",
];

/// Reference-grid objects inside the mixed bag.
pub(crate) const REFERENCE_GRID: &[&str] = &["emmGrid", "emm_list"];

/// Statistic resolved from the summary columns (or a per-type exception).
pub(crate) const AMBIGUOUS: &[&str] = &[
    "gam",
    "geeglm",
    "glht",
    "glmerMod",
    "coeftest",
    "mira",
    "mipo",
    "glmmPQL",
    "gamm",
    "gamm4",
    "multinom",
    "polr",
    "fixest",
    "svyglm.nb",
    "svyglm.zip",
];

/// Supported models with no known statistic.
pub(crate) const NO_STATISTIC: &[&str] = &["htest", "ridgelm", "glmnet", "cv.glmnet", "nestedLogit"];

/// Families whose GLM coefficients are t-distributed (case-insensitive).
pub(crate) const T_FAMILIES: &[&str] = &[
    "gaussian",
    "gamma",
    "quasi",
    "quasibinomial",
    "quasipoisson",
    "inverse.gaussian",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bucket {
    Unsupported,
    Fixed(Statistic),
    MixedBag,
    Ambiguous,
}

pub(crate) static BUCKETS: Lazy<HashMap<&'static str, Bucket>> = Lazy::new(|| {
    let lists: [(&[&str], Bucket); 7] = [
        (UNSUPPORTED, Bucket::Unsupported),
        (T_STATISTIC, Bucket::Fixed(Statistic::T)),
        (Z_STATISTIC, Bucket::Fixed(Statistic::Z)),
        (F_STATISTIC, Bucket::Fixed(Statistic::F)),
        (CHI_SQUARED, Bucket::Fixed(Statistic::ChiSquared)),
        (MIXED_BAG, Bucket::MixedBag),
        (AMBIGUOUS, Bucket::Ambiguous),
    ];
    lists
        .into_iter()
        .flat_map(|(tags, bucket)| tags.iter().map(move |&tag| (tag, bucket)))
        .collect()
});

static SUPPORTED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    BUCKETS
        .keys()
        .copied()
        .chain(TWEEDIE.iter().copied())
        .chain(NO_STATISTIC.iter().copied())
        .collect()
});

pub(crate) fn bucket(tag: &str) -> Option<Bucket> {
    BUCKETS.get(tag).copied()
}

/// Whether `tag` names a supported statistical model.
pub fn is_model(tag: &str) -> bool {
    SUPPORTED.contains(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_LISTS: &[(&str, &[&str])] = &[
        ("unsupported", UNSUPPORTED),
        ("t", T_STATISTIC),
        ("z", Z_STATISTIC),
        ("F", F_STATISTIC),
        ("chi-squared", CHI_SQUARED),
        ("mixed bag", MIXED_BAG),
        ("ambiguous", AMBIGUOUS),
    ];

    #[test]
    fn buckets_are_disjoint() {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (name, tags) in ALL_LISTS {
            for tag in *tags {
                if let Some(other) = seen.insert(*tag, *name) {
                    panic!("`{tag}` is in both `{other}` and `{name}`");
                }
            }
        }
        assert_eq!(seen.len(), BUCKETS.len());
    }

    #[test]
    fn tweedie_models_are_only_double_listed_as_unsupported() {
        for tag in TWEEDIE {
            assert_eq!(bucket(tag), Some(Bucket::Unsupported), "{tag}");
        }
    }

    #[test]
    fn reference_grids_live_in_the_mixed_bag() {
        for tag in REFERENCE_GRID {
            assert_eq!(bucket(tag), Some(Bucket::MixedBag));
        }
    }

    #[test]
    fn registry_membership() {
        assert!(is_model("lm"));
        assert!(is_model("htest"));
        assert!(is_model("glmnet"));
        assert!(is_model("cpglmm"));
        assert!(!is_model("data.frame"));
        assert!(!is_model("LM"));
    }
}

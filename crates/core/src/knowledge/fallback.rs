//! Built-in tables used when no processed data file is present.

#[derive(Debug, Clone, Copy)]
pub(super) struct HealthSeed {
    pub ingredient: &'static str,
    pub score: f64,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct SubstituteSeed {
    pub name: &'static str,
    pub score: f64,
    pub role: &'static str,
    pub confidence: f64,
}

pub(super) const HEALTH_SEEDS: &[HealthSeed] = &[
    HealthSeed { ingredient: "aqua", score: 95.0, reason: "Water - safe solvent" },
    HealthSeed { ingredient: "water", score: 95.0, reason: "Water - safe solvent" },
    HealthSeed { ingredient: "glycerin", score: 88.0, reason: "Excellent humectant" },
    HealthSeed { ingredient: "niacinamide", score: 90.0, reason: "Vitamin B3 - brightening" },
    HealthSeed { ingredient: "hyaluronic acid", score: 92.0, reason: "Superior hydration" },
    HealthSeed {
        ingredient: "sodium hyaluronate",
        score: 92.0,
        reason: "Hyaluronic acid salt - hydration",
    },
    HealthSeed { ingredient: "tocopherol", score: 85.0, reason: "Vitamin E antioxidant" },
    HealthSeed { ingredient: "ascorbic acid", score: 88.0, reason: "Vitamin C - brightening" },
    HealthSeed { ingredient: "retinol", score: 82.0, reason: "Anti-aging, can irritate" },
    HealthSeed { ingredient: "panthenol", score: 87.0, reason: "Vitamin B5 - soothing" },
    HealthSeed { ingredient: "allantoin", score: 83.0, reason: "Soothing and healing" },
    HealthSeed { ingredient: "cetearyl alcohol", score: 75.0, reason: "Fatty alcohol - emollient" },
    HealthSeed { ingredient: "butylene glycol", score: 70.0, reason: "Humectant - generally safe" },
    HealthSeed {
        ingredient: "caprylic/capric triglyceride",
        score: 78.0,
        reason: "Coconut-derived emollient",
    },
    HealthSeed { ingredient: "xanthan gum", score: 80.0, reason: "Natural thickener" },
    HealthSeed {
        ingredient: "disodium edta",
        score: 65.0,
        reason: "Chelating agent - helps preserve",
    },
    HealthSeed { ingredient: "phenoxyethanol", score: 45.0, reason: "Preservative with concerns" },
    HealthSeed { ingredient: "parfum", score: 20.0, reason: "Allergen risk" },
    HealthSeed { ingredient: "fragrance", score: 20.0, reason: "Allergen risk" },
    HealthSeed { ingredient: "methylparaben", score: 15.0, reason: "Endocrine disruptor" },
    HealthSeed { ingredient: "propylparaben", score: 12.0, reason: "Hormone disruptor" },
    HealthSeed { ingredient: "sodium lauryl sulfate", score: 25.0, reason: "Harsh surfactant" },
];

pub(super) const SUBSTITUTE_SEEDS: &[(&str, &[SubstituteSeed])] = &[
    (
        "methylparaben",
        &[
            SubstituteSeed {
                name: "leucidal liquid",
                score: 75.0,
                role: "preservative",
                confidence: 0.85,
            },
            SubstituteSeed {
                name: "sodium benzoate",
                score: 65.0,
                role: "preservative",
                confidence: 0.80,
            },
        ],
    ),
    (
        "propylparaben",
        &[SubstituteSeed {
            name: "potassium sorbate",
            score: 70.0,
            role: "preservative",
            confidence: 0.82,
        }],
    ),
    (
        "parfum",
        &[
            SubstituteSeed {
                name: "fragrance-free",
                score: 95.0,
                role: "remove fragrance",
                confidence: 0.95,
            },
            SubstituteSeed {
                name: "essential oil blend",
                score: 60.0,
                role: "natural fragrance",
                confidence: 0.70,
            },
        ],
    ),
    (
        "fragrance",
        &[SubstituteSeed {
            name: "fragrance-free",
            score: 95.0,
            role: "remove fragrance",
            confidence: 0.95,
        }],
    ),
    (
        "sodium lauryl sulfate",
        &[
            SubstituteSeed {
                name: "sodium cocoyl isethionate",
                score: 78.0,
                role: "surfactant",
                confidence: 0.88,
            },
            SubstituteSeed {
                name: "decyl glucoside",
                score: 82.0,
                role: "surfactant",
                confidence: 0.85,
            },
        ],
    ),
];

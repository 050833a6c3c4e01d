//! Curated reference library: known drugs plus kinase-inhibitor candidates.
//!
//! Descriptors are literature values. Fsp3, heavy-atom counts and molar
//! refractivity are approximations where no curated value was available.

use admetyx_common::DescriptorVector;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compound::Compound;

/// Source tag carried by every library compound.
pub const LIBRARY_SOURCE: &str = "reference_library";

/// Target families covered by the screening campaign.
pub const TARGETS: [&str; 16] = [
    "COX-1/2", "EGFR", "HER2", "ALK", "BRAF", "MEK", "PI3K", "mTOR", "CDK4/6", "PARP", "JAK2", "VEGFR",
    "BCR-ABL", "HDAC", "Proteasome", "Topoisomerase",
];

/// IC50 below which a compound counts as highly active.
pub const HIGH_ACTIVITY_IC50_NM: f64 = 100.0;

/// One curated compound with its annotations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub compound: Compound,
    pub target: String,
    pub activity: String,
    pub ic50_nm: f64,
    /// Oral bioavailability (%)
    pub bioavailability: u32,
    /// Curated drug-likeness call
    pub drug_like: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarySummary {
    pub total_compounds: usize,
    pub drug_like_count: usize,
    /// Rounded to one decimal
    pub drug_like_pct: f64,
    /// Rounded to three decimals
    pub avg_qed: f64,
    pub high_activity_count: usize,
    pub targets_covered: usize,
    /// Campaign target families (from [`TARGETS`]) with at least one library compound
    pub campaign_targets: Vec<String>,
}

struct Row {
    name: &'static str,
    smiles: &'static str,
    // mw, logp, hbd, hba, tpsa, rotatable bonds, qed, fsp3, heavy atoms, molar refractivity
    d: (f64, f64, u32, u32, f64, u32, f64, f64, u32, f64),
    drug_like: bool,
    target: &'static str,
    activity: &'static str,
    ic50_nm: f64,
    bioavailability: u32,
}

const ROWS: [Row; 20] = [
    Row {
        name: "Aspirin",
        smiles: "CC(=O)Oc1ccccc1C(=O)O",
        d: (180.16, 1.19, 1, 4, 63.6, 3, 0.55, 0.11, 13, 44.7),
        drug_like: true,
        target: "COX-1/2",
        activity: "anti-inflammatory",
        ic50_nm: 50.0,
        bioavailability: 80,
    },
    Row {
        name: "Ibuprofen",
        smiles: "CC(C)Cc1ccc(cc1)C(C)C(=O)O",
        d: (206.29, 3.97, 1, 2, 37.3, 4, 0.67, 0.46, 15, 61.0),
        drug_like: true,
        target: "COX-1/2",
        activity: "anti-inflammatory",
        ic50_nm: 13.0,
        bioavailability: 100,
    },
    Row {
        name: "Paracetamol",
        smiles: "CC(=O)Nc1ccc(O)cc1",
        d: (151.16, 0.91, 2, 3, 49.3, 2, 0.59, 0.125, 11, 42.7),
        drug_like: true,
        target: "COX-3",
        activity: "analgesic",
        ic50_nm: 25.0,
        bioavailability: 88,
    },
    Row {
        name: "Caffeine",
        smiles: "Cn1cnc2c1c(=O)n(c(=O)n2C)C",
        d: (194.19, -0.07, 0, 6, 58.4, 0, 0.60, 0.375, 14, 51.2),
        drug_like: true,
        target: "Adenosine receptor",
        activity: "stimulant",
        ic50_nm: 44_000.0,
        bioavailability: 100,
    },
    Row {
        name: "Metformin",
        smiles: "CN(C)C(=N)NC(=N)N",
        d: (129.16, -1.43, 4, 5, 91.8, 2, 0.26, 0.5, 9, 36.9),
        drug_like: true,
        target: "AMPK",
        activity: "antidiabetic",
        ic50_nm: 100_000.0,
        bioavailability: 55,
    },
    Row {
        name: "Atorvastatin",
        smiles: "CC(C)c1c(C(=O)Nc2ccccc2F)c(-c2ccccc2)c(-c2ccc(F)cc2)n1CC[C@@H](O)C[C@@H](O)CC(=O)O",
        d: (558.64, 6.36, 4, 9, 111.0, 13, 0.45, 0.27, 41, 155.0),
        drug_like: false,
        target: "HMG-CoA reductase",
        activity: "antihyperlipidemic",
        ic50_nm: 8.2,
        bioavailability: 14,
    },
    Row {
        name: "Amlodipine",
        smiles: "CCOC(=O)C1=C(COCCN)NC(C)=C(C(=O)OC)C1c1ccccc1Cl",
        d: (408.88, 3.0, 2, 8, 97.9, 9, 0.56, 0.40, 28, 106.0),
        drug_like: true,
        target: "L-type Ca channel",
        activity: "antihypertensive",
        ic50_nm: 0.9,
        bioavailability: 64,
    },
    Row {
        name: "Omeprazole",
        smiles: "COc1ccc2[nH]c(S(=O)Cc3ncc(C)c(OC)c3C)nc2c1",
        d: (345.42, 2.23, 1, 7, 87.8, 5, 0.72, 0.29, 24, 94.5),
        drug_like: true,
        target: "H+/K+ ATPase",
        activity: "proton pump inhibitor",
        ic50_nm: 0.5,
        bioavailability: 65,
    },
    Row {
        name: "Sildenafil",
        smiles: "CCCC1=NN(C)C(=O)c2[nH]c(-c3cc(S(=O)(=O)N4CCN(CC4)C)ccc3OCC)c3c(CCC)ccc(=O)nc23",
        d: (474.58, 1.9, 1, 9, 113.0, 6, 0.53, 0.45, 33, 127.0),
        drug_like: false,
        target: "PDE5",
        activity: "vasodilator",
        ic50_nm: 3.5,
        bioavailability: 40,
    },
    Row {
        name: "Fluoxetine",
        smiles: "CNCCC(Oc1ccc(cc1)C(F)(F)F)c1ccccc1",
        d: (309.33, 4.05, 1, 2, 21.3, 7, 0.76, 0.24, 22, 79.3),
        drug_like: true,
        target: "SERT",
        activity: "antidepressant",
        ic50_nm: 25.8,
        bioavailability: 72,
    },
    Row {
        name: "Warfarin",
        smiles: "OC(=O)c1ccccc1/C=C(\\C)C(=O)c1ccccc1O",
        d: (308.33, 2.7, 1, 5, 63.6, 5, 0.50, 0.11, 23, 84.6),
        drug_like: true,
        target: "Vitamin K epoxide reductase",
        activity: "anticoagulant",
        ic50_nm: 1.0,
        bioavailability: 100,
    },
    Row {
        name: "Tamoxifen",
        smiles: "CCC(=C(c1ccccc1)c1ccc(OCCN(C)C)cc1)c1ccccc1",
        d: (371.51, 6.3, 0, 2, 18.5, 8, 0.48, 0.23, 28, 117.0),
        drug_like: false,
        target: "Estrogen receptor",
        activity: "antiestrogen",
        ic50_nm: 2.0,
        bioavailability: 100,
    },
    Row {
        name: "Dexamethasone",
        smiles: "C[C@@H]1C[C@H]2[C@@H]3CC(F)c4cc(=O)c(cc4[C@@]3(C)C[C@@H]2[C@@]1(O)C(=O)CO)O",
        d: (392.46, 1.83, 3, 7, 105.0, 2, 0.49, 0.64, 28, 97.9),
        drug_like: false,
        target: "Glucocorticoid receptor",
        activity: "anti-inflammatory",
        ic50_nm: 1.2,
        bioavailability: 80,
    },
    Row {
        name: "Ciprofloxacin",
        smiles: "OC(=O)c1cn(C2CC2)c2cc(N3CCNCC3)c(F)cc2c1=O",
        d: (331.34, 0.28, 2, 8, 75.0, 2, 0.74, 0.35, 24, 86.9),
        drug_like: true,
        target: "DNA gyrase / Topoisomerase IV",
        activity: "antibacterial",
        ic50_nm: 1.0,
        bioavailability: 70,
    },
    Row {
        name: "Losartan",
        smiles: "CCCCc1nc(Cl)c(CO)n1Cc1ccc(-c2ccccc2-c2tetrazol-5-yl)cc1",
        d: (422.92, 4.01, 2, 8, 96.5, 7, 0.62, 0.32, 30, 117.0),
        drug_like: true,
        target: "AT1 receptor",
        activity: "antihypertensive",
        ic50_nm: 20.0,
        bioavailability: 33,
    },
    Row {
        name: "Naloxone",
        smiles: "O=C1CC[C@@H]2c3c(O)ccc4c3[C@@]2(CC1=O)[C@@H](O)CC4N(CC=C)CC=C",
        d: (327.37, 1.25, 2, 5, 65.8, 2, 0.33, 0.47, 24, 88.3),
        drug_like: true,
        target: "Opioid receptors",
        activity: "opioid antagonist",
        ic50_nm: 1.0,
        bioavailability: 2,
    },
    Row {
        name: "Compound_A7",
        smiles: "Cc1ccc(NC(=O)c2ccc(CN3CCN(C)CC3)cc2)cc1Nc1nccc(-c2cccnc2)n1",
        d: (493.6, 3.6, 3, 9, 86.2, 7, 0.42, 0.21, 37, 147.0),
        drug_like: false,
        target: "EGFR",
        activity: "kinase inhibitor",
        ic50_nm: 0.1,
        bioavailability: 45,
    },
    Row {
        name: "Compound_B3",
        smiles: "CN1CCN(c2ccc(Nc3ncc(F)c(Nc4cc(N(C)C)ccc4=O)n3)cc2)CC1",
        d: (460.54, 2.9, 3, 9, 78.5, 5, 0.55, 0.25, 33, 130.0),
        drug_like: true,
        target: "ALK",
        activity: "kinase inhibitor",
        ic50_nm: 0.5,
        bioavailability: 60,
    },
    Row {
        name: "Compound_C9",
        smiles: "O=C(Nc1ccc(Oc2ccc(NC(=O)Nc3ccc(Cl)c(CF3)c3)cc2)cc1)c1ccc[nH]1",
        d: (500.89, 5.1, 4, 7, 92.4, 8, 0.38, 0.05, 35, 128.0),
        drug_like: false,
        target: "BRAF",
        activity: "kinase inhibitor",
        ic50_nm: 18.0,
        bioavailability: 30,
    },
    Row {
        name: "Compound_D2",
        smiles: "CC(=O)Nc1ccc(-c2ccc(NC(=O)c3ccc(N(C)C)cc3)cc2)cc1",
        d: (389.46, 2.5, 2, 6, 71.3, 7, 0.63, 0.13, 29, 116.0),
        drug_like: true,
        target: "JAK2",
        activity: "kinase inhibitor",
        ic50_nm: 5.0,
        bioavailability: 70,
    },
];

impl Row {
    fn entry(&self) -> LibraryEntry {
        let (mw, logp, hbd, hba, tpsa, rotatable_bonds, qed, fsp3, heavy_atoms, molar_refractivity) = self.d;
        let descriptors = DescriptorVector {
            mw,
            logp,
            hbd,
            hba,
            tpsa,
            rotatable_bonds,
            qed,
            fsp3,
            heavy_atoms,
            molar_refractivity,
        };
        LibraryEntry {
            compound: Compound::new(self.smiles, LIBRARY_SOURCE)
                .with_id(library_id(self.name))
                .with_name(self.name)
                .with_descriptors(descriptors),
            target: self.target.to_string(),
            activity: self.activity.to_string(),
            ic50_nm: self.ic50_nm,
            bioavailability: self.bioavailability,
            drug_like: self.drug_like,
        }
    }
}

/// Stable identity of a library compound, derived from its name.
pub fn library_id(name: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{LIBRARY_SOURCE}/{name}").as_bytes())
}

/// The 20 annotated library entries, in curation order.
pub fn reference_library() -> Vec<LibraryEntry> {
    ROWS.iter().map(Row::entry).collect()
}

/// Library compounds ready for screening, each carrying its curated descriptors.
pub fn reference_compounds() -> Vec<Compound> {
    reference_library().into_iter().map(|e| e.compound).collect()
}

pub fn summarize(entries: &[LibraryEntry]) -> LibrarySummary {
    let total = entries.len();
    let drug_like_count = entries.iter().filter(|e| e.drug_like).count();
    let high_activity_count = entries.iter().filter(|e| e.ic50_nm < HIGH_ACTIVITY_IC50_NM).count();
    let mut targets: Vec<&str> = entries.iter().map(|e| e.target.as_str()).collect();
    targets.sort_unstable();
    targets.dedup();
    let campaign_targets = TARGETS
        .iter()
        .filter(|t| targets.binary_search(t).is_ok())
        .map(|t| t.to_string())
        .collect();

    let (drug_like_pct, avg_qed) = if total == 0 {
        (0.0, 0.0)
    } else {
        let qed_sum: f64 = entries
            .iter()
            .filter_map(|e| e.compound.descriptors.map(|d| d.qed))
            .sum();
        (
            (drug_like_count as f64 / total as f64 * 1000.0).round() / 10.0,
            (qed_sum / total as f64 * 1000.0).round() / 1000.0,
        )
    };

    LibrarySummary {
        total_compounds: total,
        drug_like_count,
        drug_like_pct,
        avg_qed,
        high_activity_count,
        targets_covered: targets.len(),
        campaign_targets,
    }
}

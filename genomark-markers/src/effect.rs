//! Effect records produced when a variant is resolved against the tree.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use genomark_core::models::Pos;

use crate::codon::{CodonChangeCalculator, CodonTable, FrameCodonChange, StandardCodonTable};
use crate::config::EffectConfig;
use crate::marker::{Marker, MarkerKind};

///
/// Putative impact of an effect, most severe first.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EffectImpact {
    High,
    Moderate,
    Low,
    Modifier,
}

impl Display for EffectImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EffectImpact::High => "HIGH",
            EffectImpact::Moderate => "MODERATE",
            EffectImpact::Low => "LOW",
            EffectImpact::Modifier => "MODIFIER",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectType {
    ChromosomeLargeDeletion,
    Chromosome,
    GeneDeleted,
    TranscriptDeleted,
    ExonDeleted,
    FrameShift,
    StartLost,
    StopLost,
    StopGained,
    SpliceSiteAcceptor,
    SpliceSiteDonor,
    CodonChange,
    CodonInsertion,
    CodonDeletion,
    NonSynonymousCoding,
    Utr5Deleted,
    Utr3Deleted,
    SpliceSiteRegion,
    SpliceSiteBranch,
    StartGained,
    SynonymousCoding,
    Utr5Prime,
    Utr3Prime,
    Exon,
    Cds,
    Intron,
    Transcript,
    Gene,
    Upstream,
    Downstream,
    Intragenic,
    Intergenic,
    Regulation,
    Motif,
    Custom,
    Generic,
}

impl EffectType {
    pub fn impact(&self) -> EffectImpact {
        use EffectType::*;
        match self {
            ChromosomeLargeDeletion | GeneDeleted | TranscriptDeleted | ExonDeleted | FrameShift
            | StartLost | StopLost | StopGained | SpliceSiteAcceptor | SpliceSiteDonor => {
                EffectImpact::High
            }
            CodonChange | CodonInsertion | CodonDeletion | NonSynonymousCoding | Utr5Deleted
            | Utr3Deleted => EffectImpact::Moderate,
            SpliceSiteRegion | SpliceSiteBranch | StartGained | SynonymousCoding => {
                EffectImpact::Low
            }
            _ => EffectImpact::Modifier,
        }
    }

    /// Sequence Ontology term for this effect.
    pub fn so_term(&self) -> &'static str {
        use EffectType::*;
        match self {
            ChromosomeLargeDeletion => "chromosome_number_variation",
            Chromosome => "chromosome",
            GeneDeleted => "gene_deletion",
            TranscriptDeleted => "transcript_ablation",
            ExonDeleted => "exon_loss_variant",
            FrameShift => "frameshift_variant",
            StartLost => "start_lost",
            StopLost => "stop_lost",
            StopGained => "stop_gained",
            SpliceSiteAcceptor => "splice_acceptor_variant",
            SpliceSiteDonor => "splice_donor_variant",
            CodonChange => "coding_sequence_variant",
            CodonInsertion => "inframe_insertion",
            CodonDeletion => "inframe_deletion",
            NonSynonymousCoding => "missense_variant",
            Utr5Deleted => "5_prime_UTR_truncation",
            Utr3Deleted => "3_prime_UTR_truncation",
            SpliceSiteRegion => "splice_region_variant",
            SpliceSiteBranch => "splice_branch_variant",
            StartGained => "5_prime_UTR_premature_start_codon_gain_variant",
            SynonymousCoding => "synonymous_variant",
            Utr5Prime => "5_prime_UTR_variant",
            Utr3Prime => "3_prime_UTR_variant",
            Exon => "non_coding_transcript_exon_variant",
            Cds => "coding_sequence_variant",
            Intron => "intron_variant",
            Transcript => "non_coding_transcript_variant",
            Gene => "gene_variant",
            Upstream => "upstream_gene_variant",
            Downstream => "downstream_gene_variant",
            Intragenic => "intragenic_variant",
            Intergenic => "intergenic_region",
            Regulation => "regulatory_region_variant",
            Motif => "TF_binding_site_variant",
            Custom => "custom",
            Generic => "sequence_feature",
        }
    }
}

impl From<MarkerKind> for EffectType {
    fn from(kind: MarkerKind) -> Self {
        match kind {
            MarkerKind::Genome | MarkerKind::Chromosome => EffectType::Chromosome,
            MarkerKind::Gene => EffectType::Gene,
            MarkerKind::Transcript => EffectType::Transcript,
            MarkerKind::Exon => EffectType::Exon,
            MarkerKind::Intron => EffectType::Intron,
            MarkerKind::Utr5Prime => EffectType::Utr5Prime,
            MarkerKind::Utr3Prime => EffectType::Utr3Prime,
            MarkerKind::Cds => EffectType::Cds,
            MarkerKind::SpliceSiteAcceptor => EffectType::SpliceSiteAcceptor,
            MarkerKind::SpliceSiteDonor => EffectType::SpliceSiteDonor,
            MarkerKind::SpliceSiteRegion => EffectType::SpliceSiteRegion,
            MarkerKind::SpliceSiteBranch => EffectType::SpliceSiteBranch,
            MarkerKind::Upstream => EffectType::Upstream,
            MarkerKind::Downstream => EffectType::Downstream,
            MarkerKind::Intergenic => EffectType::Intergenic,
            MarkerKind::Intragenic => EffectType::Intragenic,
            MarkerKind::Regulation => EffectType::Regulation,
            MarkerKind::Motif => EffectType::Motif,
            MarkerKind::Custom => EffectType::Custom,
            MarkerKind::Generic => EffectType::Generic,
        }
    }
}

impl Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SCREAMING_SNAKE_CASE, same as the serialized form
        let s = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", s.trim_matches('"'))
    }
}

///
/// Data quality problems found while resolving an effect. These never abort
/// the computation, they are attached to the result.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningType {
    RefDoesNotMatchGenome,
    SequenceNotAvailable,
    ChromosomeNotFound,
    TranscriptIncomplete,
    TranscriptMultipleStopCodons,
    TranscriptNoStartCodon,
    TranscriptNoStopCodon,
    TranscriptMixedStrands,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectWarning {
    pub warning: WarningType,
    pub message: String,
}

impl EffectWarning {
    pub fn new(warning: WarningType, message: impl Into<String>) -> Self {
        EffectWarning {
            warning,
            message: message.into(),
        }
    }
}

impl Display for EffectWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.warning, self.message)
    }
}

///
/// One consequence of a variant on one feature.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantEffect {
    /// The feature that was hit (coordinates, kind, id, parent link).
    pub marker: Marker,
    pub effect_type: EffectType,
    pub impact: EffectImpact,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Pos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<EffectWarning>,
}

impl VariantEffect {
    pub fn new(marker: &Marker, effect_type: EffectType, detail: impl Into<String>) -> Self {
        VariantEffect {
            marker: marker.clone(),
            effect_type,
            impact: effect_type.impact(),
            detail: detail.into(),
            distance: None,
            gene_id: None,
            transcript_id: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_distance(mut self, distance: Pos) -> Self {
        self.distance = Some(distance);
        self
    }
}

impl Display for VariantEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.effect_type, self.impact, self.marker.interval)?;
        if let Some(distance) = self.distance {
            write!(f, "\tdistance={}", distance)?;
        }
        if !self.detail.is_empty() {
            write!(f, "\t{}", self.detail)?;
        }
        Ok(())
    }
}

///
/// Accumulator passed down the tree while resolving a variant.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantEffects {
    effects: Vec<VariantEffect>,
    /// Warnings not tied to a specific effect.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<EffectWarning>,
}

impl VariantEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, marker: &Marker, effect_type: EffectType, detail: impl Into<String>) {
        self.effects
            .push(VariantEffect::new(marker, effect_type, detail));
    }

    pub fn add_effect(&mut self, effect: VariantEffect) {
        self.effects.push(effect);
    }

    pub fn add_warning(&mut self, warning: EffectWarning) {
        self.warnings.push(warning);
    }

    /// Position to pass to [VariantEffects::since] later on.
    pub fn mark(&self) -> usize {
        self.effects.len()
    }

    /// Effects added after `mark`.
    pub fn since(&mut self, mark: usize) -> &mut [VariantEffect] {
        let mark = mark.min(self.effects.len());
        &mut self.effects[mark..]
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantEffect> {
        self.effects.iter()
    }

    pub fn warnings(&self) -> &[EffectWarning] {
        &self.warnings
    }

    pub fn has(&self, effect_type: EffectType) -> bool {
        self.effects.iter().any(|e| e.effect_type == effect_type)
    }

    pub fn effect_types(&self) -> Vec<EffectType> {
        self.effects.iter().map(|e| e.effect_type).collect()
    }

    /// Most severe effects first, ties broken by effect type.
    pub fn sort(&mut self) {
        self.effects
            .sort_by(|a, b| a.impact.cmp(&b.impact).then(a.effect_type.cmp(&b.effect_type)));
    }

    pub fn into_vec(self) -> Vec<VariantEffect> {
        self.effects
    }
}

impl IntoIterator for VariantEffects {
    type Item = VariantEffect;
    type IntoIter = std::vec::IntoIter<VariantEffect>;

    fn into_iter(self) -> Self::IntoIter {
        self.effects.into_iter()
    }
}

static STANDARD_CODON_TABLE: StandardCodonTable = StandardCodonTable;
static FRAME_CODON_CHANGE: FrameCodonChange = FrameCodonChange;

///
/// Everything effect resolution needs besides the variant and the tree:
/// configuration, genetic code and the coding consequence calculator.
///
#[derive(Clone, Copy)]
pub struct EffectContext<'a> {
    pub config: &'a EffectConfig,
    pub codon_table: &'a dyn CodonTable,
    pub calculator: &'a dyn CodonChangeCalculator,
}

impl<'a> EffectContext<'a> {
    /// Standard genetic code and the default calculator.
    pub fn new(config: &'a EffectConfig) -> Self {
        EffectContext {
            config,
            codon_table: &STANDARD_CODON_TABLE,
            calculator: &FRAME_CODON_CHANGE,
        }
    }

    pub fn with_codon_table(mut self, codon_table: &'a dyn CodonTable) -> Self {
        self.codon_table = codon_table;
        self
    }

    pub fn with_calculator(mut self, calculator: &'a dyn CodonChangeCalculator) -> Self {
        self.calculator = calculator;
        self
    }
}

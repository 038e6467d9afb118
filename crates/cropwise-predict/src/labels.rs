//! Training vocabulary of the pest classifier.

use std::path::Path;

use cropwise_core::{Error, Result};

/// Pest labels in model output order. Index `i` names output unit `i`.
pub const PEST_LABELS: &[&str] = &[
    "adristyrannus",
    "aleurocanthus spiniferus",
    "alfalfa plant bug",
    "alfalfa seed chalcid",
    "alfalfa weevil",
    "ampelophaga",
    "aphids",
    "aphis citricola vander goot",
    "apolygus lucorum",
    "army worm",
    "asiatic rice borer",
    "bactrocera tsuneonis",
    "beet army worm",
    "beet fly",
    "beet spot flies",
    "beet weevil",
    "beetle",
    "bird cherry-oataphid",
    "black cutworm",
    "black hairy",
    "blister beetle",
    "bollworm",
    "brevipoalpus lewisi mcgregor",
    "brown plant hopper",
    "cabbage army worm",
    "cerodonta denticornis",
    "ceroplastes rubens",
    "chlumetia transversa",
    "chrysomphalus aonidum",
    "cicadella viridis",
    "cicadellidae",
    "colomerus vitis",
    "corn borer",
    "corn earworm",
    "cutworm",
    "dacus dorsalis(hendel)",
    "dasineura sp",
    "deporaus marginatus pascoe",
    "english grain aphid",
    "erythroneura apicalis",
    "fall armyworm",
    "field cricket",
    "flax budworm",
    "flea beetle",
    "fruit piercing moth",
    "gall fly",
    "grain spreader thrips",
    "grasshopper",
    "green bug",
    "grub",
    "icerya purchasi maskell",
    "indigo caterpillar",
    "jute aphid",
    "jute hairy",
    "jute red mite",
    "jute semilooper",
    "jute stem girdler",
    "jute stem weevil",
    "jute stick insect",
    "large cutworm",
    "lawana imitata melichar",
    "leaf beetle",
    "legume blister beetle",
    "limacodidae",
    "locust",
    "locustoidea",
    "longlegged spider mite",
    "lycorma delicatula",
    "lytta polita",
    "mango flat beak leafhopper",
    "meadow moth",
    "mealybug",
    "miridae",
    "mites",
    "mole cricket",
    "nipaecoccus vastalor",
    "odontothrips loti",
    "oides decempunctata",
    "paddy stem maggot",
    "panonchus citri mcgregor",
    "papilio xuthus",
    "parathrene regalis",
    "parlatoria zizyphus lucus",
    "peach borer",
    "penthaleus major",
    "phyllocnistis citrella stainton",
    "phyllocoptes oleiverus ashmead",
    "pieris canidia",
    "pod borer",
    "polyphagotars onemus latus",
    "potosiabre vitarsis",
    "prodenia litura",
    "pseudococcus comstocki kuwana",
    "red spider",
    "rhytidodera bowrinii white",
    "rice gall midge",
    "rice leaf caterpillar",
    "rice leaf roller",
    "rice leafhopper",
    "rice shell pest",
    "rice stemfly",
    "rice water weevil",
    "salurnis marginella guerr",
    "sawfly",
    "scirtothrips dorsalis hood",
    "sericaorient alismots chulsky",
    "small brown plant hopper",
    "spilosoma obliqua",
    "stem borer",
    "sternochetus frigidus",
    "tarnished plant bug",
    "termite",
    "termite odontotermes (rambur)",
    "tetradacus c bactrocera minax",
    "therioaphis maculata buckton",
    "thrips",
    "toxoptera aurantii",
    "toxoptera citricidus",
    "trialeurodes vaporariorum",
    "unaspis yanonensis",
    "viteus vitifoliae",
    "wheat blossom midge",
    "wheat phloeothrips",
    "wheat sawfly",
    "white backed plant hopper",
    "white margined moth",
    "whitefly",
    "wireworm",
    "xylotrechus",
    "yellow cutworm",
    "yellow mite",
    "yellow rice borer",
];

/// Built-in vocabulary as owned strings.
pub fn default_labels() -> Vec<String> {
    PEST_LABELS.iter().map(|l| l.to_string()).collect()
}

/// Read a newline-delimited vocabulary, one label per line in output order.
///
/// Lines are trimmed and blank lines skipped. Duplicates are rejected since
/// two output units can never share a label.
pub fn load_labels(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::ModelLoad(format!("Failed to read labels {}: {}", path.display(), e))
    })?;

    let labels: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    if labels.is_empty() {
        return Err(Error::ModelLoad(format!(
            "Label file {} is empty",
            path.display()
        )));
    }

    let mut seen = std::collections::HashSet::new();
    if let Some(dup) = labels.iter().find(|l| !seen.insert(l.as_str())) {
        return Err(Error::ModelLoad(format!("Duplicate label: {}", dup)));
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_vocabulary_size() {
        assert_eq!(PEST_LABELS.len(), 132);
    }

    #[test]
    fn test_vocabulary_is_unique() {
        let unique: HashSet<&str> = PEST_LABELS.iter().copied().collect();
        assert_eq!(unique.len(), PEST_LABELS.len());
    }

    #[test]
    fn test_vocabulary_order_anchors() {
        assert_eq!(PEST_LABELS[0], "adristyrannus");
        assert_eq!(PEST_LABELS[6], "aphids");
        assert_eq!(PEST_LABELS[131], "yellow rice borer");
    }

    #[test]
    fn test_load_labels_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(file, "aphids\n\n  thrips  \nwhitefly").unwrap();
        let labels = load_labels(file.path()).unwrap();
        assert_eq!(labels, vec!["aphids", "thrips", "whitefly"]);
    }

    #[test]
    fn test_load_labels_rejects_duplicates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(file, "aphids\nthrips\naphids").unwrap();
        let err = load_labels(file.path()).unwrap_err();
        assert!(err.to_string().contains("Duplicate label: aphids"));
    }

    #[test]
    fn test_load_labels_missing_file() {
        let err = load_labels(Path::new("/nonexistent/labels.txt")).unwrap_err();
        assert!(matches!(err, Error::ModelLoad(_)));
    }
}

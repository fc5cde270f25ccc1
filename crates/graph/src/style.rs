use extract::EntityIndex;

pub const DEFAULT_COLOR: &str = "#D3D3D3";
pub const NODE_SIZE: u32 = 20;
pub const EDGE_WIDTH: u32 = 2;

/// Fill color for an entity type.
pub fn color_for_type(entity_type: &str) -> &'static str {
    match entity_type {
        "ORG" => "#FFA07A",
        "PERSON" => "#87CEFA",
        "GPE" => "#98FB98",
        "NORP" => "#FFD700",
        "PRODUCT" => "#FFB6C1",
        "DISEASE" => "#E6E6FA",
        _ => DEFAULT_COLOR,
    }
}

/// Color for a node label: the first entity equal to it ignoring case and
/// surrounding whitespace decides.
pub fn color_for_label(label: &str, index: &EntityIndex) -> &'static str {
    let wanted = label.trim().to_lowercase();
    index
        .iter()
        .find(|(text, _)| text.trim().to_lowercase() == wanted)
        .map_or(DEFAULT_COLOR, |(_, entity_type)| color_for_type(entity_type))
}

/// Readable edge caption for a verb lemma.
pub fn display_verb(lemma: &str) -> &str {
    match lemma {
        "develop" => "developed",
        "coordinate" => "coordinated",
        "focus" => "focusing on",
        "play" => "developed",
        "lead" => "led to",
        "cause" => "caused by",
        other => other,
    }
}

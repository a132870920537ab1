//! Outbound search links for pharmacies and medical literature.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundLink {
    pub name: &'static str,
    pub url: String,
}

/// (name, URL prefix) pairs; the encoded query is appended to the prefix.
const PHARMACIES: [(&str, &str); 4] = [
    ("Farmacia San Pablo", "https://www.farmaciasanpablo.com.mx/buscar?q="),
    ("Farmacias del Ahorro", "https://www.fahorro.com/catalogsearch/result/?q="),
    ("Farmacias Guadalajara", "https://www.farmaciasguadalajara.com.mx/buscar?q="),
    ("Benavides", "https://www.benavides.com.mx/search?q="),
];

const LITERATURE: [(&str, &str); 2] = [
    ("PubMed", "https://pubmed.ncbi.nlm.nih.gov/?term="),
    ("Cochrane", "https://www.cochranelibrary.com/search?searchPhrase="),
];

pub const COFEPRIS_REGISTRY_URL: &str =
    "https://www.gob.mx/cofepris/acciones-y-programas/consulta-de-registros-sanitarios";

fn build(templates: &[(&'static str, &str)], query: &str) -> Vec<OutboundLink> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    let encoded = urlencoding::encode(query);
    templates
        .iter()
        .map(|(name, prefix)| OutboundLink {
            name,
            url: format!("{prefix}{encoded}"),
        })
        .collect()
}

/// Price and availability searches. Empty for a blank query.
pub fn pharmacy_links(query: &str) -> Vec<OutboundLink> {
    build(&PHARMACIES, query)
}

/// Literature searches plus the sanitary registry lookup.
pub fn literature_links(query: &str) -> Vec<OutboundLink> {
    let mut links = build(&LITERATURE, query);
    if !links.is_empty() {
        links.push(OutboundLink {
            name: "COFEPRIS",
            url: COFEPRIS_REGISTRY_URL.to_string(),
        });
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pharmacy_links_encode_query() {
        let links = pharmacy_links("ácido fólico");
        assert_eq!(links.len(), 4);
        assert_eq!(
            links[0].url,
            "https://www.farmaciasanpablo.com.mx/buscar?q=%C3%A1cido%20f%C3%B3lico"
        );
        assert_eq!(links[3].name, "Benavides");
    }

    #[test]
    fn literature_links_include_registry() {
        let links = literature_links("metformina");
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].url, "https://pubmed.ncbi.nlm.nih.gov/?term=metformina");
        assert_eq!(links[2].url, COFEPRIS_REGISTRY_URL);
    }

    #[test]
    fn blank_query_builds_nothing() {
        assert!(pharmacy_links("  ").is_empty());
        assert!(literature_links("").is_empty());
    }
}

use crate::identify::Site;

/// CSS selector chains for one portal, tried in order per field.
pub struct PortalSelectors {
    pub title: &'static [&'static str],
    pub price: &'static [&'static str],
    pub location: &'static [&'static str],
    pub area: &'static [&'static str],
    pub rooms: &'static [&'static str],
    pub bathrooms: &'static [&'static str],
    pub images: &'static [&'static str],
    pub description: &'static [&'static str],
    pub features: &'static [&'static str],
}

static IDEALISTA: PortalSelectors = PortalSelectors {
    title: &[
        "h1[data-testid=\"title\"]",
        "h1.main-info__title",
        ".main-info__title-main",
        "meta[property=\"og:title\"]",
        "title",
    ],
    price: &[
        "[data-testid=\"price\"]",
        ".info-data-price",
        ".main-info__price",
        ".price",
    ],
    location: &[
        "[data-testid=\"location\"]",
        ".main-info__title-minor",
        "#headerMap li",
        ".location",
    ],
    area: &[
        "[data-testid=\"surface\"]",
        ".icon-surface + span",
        ".details-property-surface",
        ".info-features span",
    ],
    rooms: &[
        "[data-testid=\"bedrooms\"]",
        ".icon-bedrooms + span",
        ".details-property-habitations",
        ".info-features span",
    ],
    bathrooms: &[
        "[data-testid=\"bathrooms\"]",
        ".icon-bathrooms + span",
        ".details-property-bathrooms",
        ".details-property_features li",
    ],
    images: &[
        "[data-testid=\"gallery-image\"]",
        ".property-gallery img",
        ".gallery img",
    ],
    description: &[
        "[data-testid=\"description\"]",
        ".comment p",
        ".property-description",
        "meta[property=\"og:description\"]",
    ],
    features: &[
        ".details-property_features li",
        ".details-property-features li",
        "[data-testid=\"features\"] li",
    ],
};

static IMOVIRTUAL: PortalSelectors = PortalSelectors {
    title: &[
        "h1[data-cy=\"adPageAdTitle\"]",
        "h1[data-testid=\"title\"]",
        "h1.property-title",
        "h1",
        "meta[property=\"og:title\"]",
    ],
    price: &[
        "[data-cy=\"adPageHeaderPrice\"]",
        "[data-testid=\"price\"]",
        ".price-value",
        ".property-price",
        "[class*=\"price\"]",
    ],
    location: &[
        "[data-testid=\"location\"]",
        "a[href=\"#map\"]",
        ".property-location",
        ".address",
    ],
    area: &[
        "[data-testid=\"table-value-area\"]",
        "[data-testid=\"area\"]",
        "[class*=\"area\"]",
        "[class*=\"surface\"]",
    ],
    rooms: &[
        "[data-testid=\"table-value-rooms_num\"]",
        "[data-testid=\"bedrooms\"]",
        "[class*=\"bedroom\"]",
        "[class*=\"quarto\"]",
    ],
    bathrooms: &[
        "[data-testid=\"table-value-bathrooms_num\"]",
        "[data-testid=\"bathrooms\"]",
        "[class*=\"bathroom\"]",
        "[class*=\"banho\"]",
    ],
    images: &[
        "img[data-testid=\"gallery-image\"]",
        "[data-cy=\"mosaic-gallery\"] img",
        ".gallery img",
    ],
    description: &[
        "[data-cy=\"adPageAdDescription\"]",
        "[data-testid=\"description\"]",
        ".property-description",
        "meta[property=\"og:description\"]",
    ],
    features: &[
        "[data-testid=\"features\"] li",
        "[data-testid=\"features\"] span",
        ".property-features span",
    ],
};

static OLX: PortalSelectors = PortalSelectors {
    title: &[
        "h1[data-testid=\"ad-title\"]",
        "[data-cy=\"ad_title\"] h4",
        "meta[property=\"og:title\"]",
        "h1",
    ],
    price: &[
        "[data-testid=\"ad-price-container\"] h3",
        "[data-testid=\"price\"]",
        ".price-tag",
        ".price",
    ],
    location: &[
        "[data-testid=\"address\"]",
        "[data-testid=\"map-aside-section\"] p",
        ".property-address",
        ".location",
    ],
    area: &[
        "[data-testid=\"size\"]",
        ".property-size",
        "[data-testid=\"ad-parameters-container\"] p",
    ],
    rooms: &[
        "[data-testid=\"rooms\"]",
        ".property-rooms",
        "[data-testid=\"ad-parameters-container\"] p",
    ],
    bathrooms: &[
        "[data-testid=\"bathrooms\"]",
        ".property-bathrooms",
        "[data-testid=\"ad-parameters-container\"] p",
    ],
    images: &[
        "[data-testid=\"swiper-image\"]",
        "[data-testid=\"gallery-image\"]",
        ".property-gallery img",
    ],
    description: &[
        "[data-testid=\"ad_description\"] div",
        "[data-testid=\"description\"]",
        "meta[property=\"og:description\"]",
    ],
    features: &[
        "[data-testid=\"ad-parameters-container\"] p",
        ".property-features span",
    ],
};

static SUPERCASA: PortalSelectors = PortalSelectors {
    title: &[
        "h1.property-title",
        "h1.title",
        "meta[property=\"og:title\"]",
        "h1",
    ],
    price: &[".property-price", ".price-tag", ".value"],
    location: &[".property-address", ".location", "h1.title"],
    area: &[
        ".property-size",
        ".property-features span",
        ".info-features span",
    ],
    rooms: &[
        ".property-rooms",
        ".property-features span",
        ".info-features span",
    ],
    bathrooms: &[
        ".property-bathrooms",
        ".property-features span",
        ".info-features span",
    ],
    images: &[".property-gallery img", "[data-testid=\"gallery-image\"]"],
    description: &[
        ".property-description",
        "meta[property=\"og:description\"]",
    ],
    features: &[
        ".property-features li",
        ".property-features span",
        ".info-features span",
    ],
};

static CASA_SAPO: PortalSelectors = PortalSelectors {
    title: &[
        "h1.property-title",
        ".detail-title",
        "meta[property=\"og:title\"]",
        "h1",
        ".listing-title",
    ],
    price: &[
        ".property-price",
        ".detail-price",
        ".price-value",
        "[class*=\"price\"]",
    ],
    location: &[
        ".property-location",
        ".detail-location",
        ".address",
        "[class*=\"location\"]",
    ],
    area: &[
        ".property-area",
        ".area-value",
        "[class*=\"area\"]",
        "[class*=\"m2\"]",
    ],
    rooms: &[
        ".property-bedrooms",
        "[class*=\"bedroom\"]",
        "[class*=\"quarto\"]",
    ],
    bathrooms: &[
        ".property-bathrooms",
        "[class*=\"bathroom\"]",
        "[class*=\"wc\"]",
    ],
    images: &[
        ".gallery img",
        ".property-images img",
        "img[src*=\"property\"]",
    ],
    description: &[
        ".property-description",
        ".detail-description",
        "meta[property=\"og:description\"]",
    ],
    features: &[".property-features li", ".features span", ".amenities li"],
};

static GENERIC: PortalSelectors = PortalSelectors {
    title: &[
        "h1",
        "meta[property=\"og:title\"]",
        ".property-title",
        ".title",
        "title",
    ],
    price: &[
        "[itemprop=\"price\"]",
        ".price",
        "[class*=\"price\"]",
        ".value",
    ],
    location: &[
        "[itemprop=\"address\"]",
        ".location",
        ".address",
        "[class*=\"location\"]",
    ],
    area: &[
        ".area",
        ".surface",
        "[class*=\"area\"]",
        "[class*=\"surface\"]",
    ],
    rooms: &[
        ".bedrooms",
        ".rooms",
        "[class*=\"bedroom\"]",
        "[class*=\"room\"]",
    ],
    bathrooms: &[".bathrooms", "[class*=\"bathroom\"]"],
    images: &[
        ".gallery img",
        "[class*=\"gallery\"] img",
        "img[src*=\"property\"]",
    ],
    description: &[
        ".description",
        "[class*=\"description\"]",
        "meta[property=\"og:description\"]",
        "meta[name=\"description\"]",
    ],
    features: &[
        ".features li",
        ".features span",
        "[class*=\"feature\"] li",
        ".amenities li",
    ],
};

impl PortalSelectors {
    /// Selector set for a portal; unknown portals get the generic set.
    pub fn for_site(site: Site) -> &'static PortalSelectors {
        match site {
            Site::Idealista => &IDEALISTA,
            Site::Imovirtual => &IMOVIRTUAL,
            Site::Olx => &OLX,
            Site::Supercasa => &SUPERCASA,
            Site::CasaSapo => &CASA_SAPO,
            Site::Unknown => &GENERIC,
        }
    }
}

// ── Tests ──

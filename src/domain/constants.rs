//! Domain constants shared by the extractor, the orchestrator and front-ends

/// Value stored in a listing field whose source element was missing from the card
pub const UNKNOWN_FIELD: &str = "N/A";

/// Image reference shown for listings without a downloaded image
pub const NO_IMAGE: &str = "No Image";

/// Column headers of a listing row, in `Listing::to_row` order
pub const ROW_HEADERS: [&str; 6] = ["Brand", "Title", "Rank", "Starting Price", "Image", "Time"];

/// Brands offered by the auction site's brand filter
pub const KNOWN_BRANDS: &[&str] = &[
    "LOUIS VUITTON", "CHANEL", "HERMES", "GUCCI", "PRADA", "ROLEX", "OMEGA", "TAG Heuer", "Cartier", "BVLGARI",
    "Tiffany＆Co.", "HARRY WINSTON", "Van Cleef＆Arpels", "A. LANGE & SOHNE", "AUDEMARS PIGUET", "Baccarat",
    "BALENCIAGA", "BALLY", "BAUME＆MERCIER", "Bell & Ross", "Berluti", "BOTTEGA VENETA", "BOUCHERON", "BREGUET",
    "BREITLING", "BUCCELLATI", "BURBERRY", "Carlo Parlati", "Carrera y Carrera", "CASIO", "CAZZANIGA", "CELINE",
    "CHARRIOL", "CHAUMET", "chloe", "Chopard", "Christian Louboutin", "CHROME HEARTS", "CITIZEN", "COACH",
    "Cole Haan", "COMME des GARCONS", "CORUM", "D＆G", "Damiani", "DE BEERS", "Dior", "DOLCE＆GABBANA", "DSQUARED2",
    "dunhill", "EDOX", "EMILIO PUCCI", "ETRO", "FEDERICO BUCCELLATI", "Felisi", "FENDI", "FRANCK MULLER", "FRED",
    "FREDERIQUE CONSTANT", "FURLA", "GaGa MILANO", "Georg Jensen", "gimel", "GIRARD PERREGAUX", "GIVENCHY",
    "GOYARD", "GRAFF", "GRAHAM", "HUBLOT", "IWC", "Jacob&co", "JAEGER LECOULTRE", "Jeunet", "JEWEL STUDIO",
    "JILSANDER", "JIMMY CHOO", "Justin Davis", "Kashikey", "Kate Spade", "LANVIN", "LOEWE", "LONG CHAMP",
    "LONGINES", "MACKINTOSH", "MARC BY MARC JACOBS", "MARC JACOBS", "MAUBOUSSIN", "MAURICE LACROIX", "MCM",
    "Meissen", "Michael Kors", "MIKIMOTO", "miu miu", "MONCLER", "MONTBLANC", "ORIENT", "Orobianco", "PANERAI",
    "PATEK PHILIPPE", "PIAGET", "POLA", "POMELLATO", "Ponte Vecchio", "RADO", "RayBan", "REGAL", "RICHARD MILLE",
    "RIMOWA", "Ritmo latino", "ROGER DUBUIS", "SAINT LAURENT", "Salvatore Ferragamo", "SEE BY CHLOE", "SEIKO",
    "Sergio Rossi", "SINN", "SOUTHERN CROSS", "Supreme", "TASAKI", "TOD'S", "Tom Ford", "Tory Burch", "TUDOR",
    "TUMI", "ULYSSE NARDIN", "UNIVERSAL GENEVE", "UNOAERRE", "VACHERON CONSTANTIN", "VALENTINO", "Vendome Aoyama",
    "Verite", "VERSACE", "WALTHAM", "Yves Saint Laurent", "ZENITH", "梶 光夫", "梶武史", "石川 暢子", "田村 俊一",
];

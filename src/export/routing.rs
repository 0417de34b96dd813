//! Category folders for exported scripts, chosen from the script name prefix.

use std::path::{Path, PathBuf};

/// Folder for scripts no prefix matches
pub const UNCATEGORIZED: &str = "[UnCategorized]";

/// Script name prefix -> category folder (`/` separates nested folders)
pub const ROUTING_TABLE: &[(&str, &str)] = &[
    ("a1_", "Muku"),
    ("b1_", "Majime"),
    ("c1_", "Rindere"),
    ("d1_", "Bookworm"),
    ("e1_", "Koakuma"),
    ("f1_", "LadyLike"),
    ("g1_", "Secretary"),
    ("h1_", "Imouto"),
    ("j1_", "Wary"),
    ("k1_", "Ojousama"),
    ("l1_", "Osananajime"),
    ("m1_", "Masochist"),
    ("n1_", "Haraguro"),
    ("p1_", "Gyaru"),
    ("v1_", "Kimajime"),
    ("w1_", "Kisakude"),
    ("a_", "Tsundere"),
    ("b_", "Kuudere"),
    ("c_", "Pure"),
    ("d_", "Yandere"),
    ("e_", "Onee-chan"),
    ("f_", "Genki"),
    ("g_", "Do-S"),
    ("crc_ck_", "[Commands & Choices]"),
    ("ck_sex", "[Commands & Choices]"),
    ("ck_h_", "[Commands & Choices]"),
    ("ck_dance_", "[Commands & Choices]"),
    ("ck_cas_", "[Commands & Choices]"),
    ("lifemode", "[Misc]/Lifemode"),
    ("idol", "[Misc]/Idol"),
    ("scout", "[Misc]/Scout"),
    ("npc", "[Misc]/NPC"),
    ("harem", "[Misc]/Harem"),
    ("yuri", "[Misc]/Yuri"),
    ("pj", "[Misc]/Pajama Collab"),
    ("cw", "[Misc]/Camping Event"),
    ("rehire", "[Misc]/Extra Maids rehire"),
    ("club_gp", "[Misc]/GP01 Club route"),
    ("xmas", "[Misc]/Xmas"),
];

/// Category of a script: the longest matching prefix wins, earlier entries
/// win ties.
pub fn route(script: &str) -> &'static str {
    let mut best: Option<(&str, &'static str)> = None;
    for &(prefix, category) in ROUTING_TABLE {
        if script.starts_with(prefix) && best.is_none_or(|(p, _)| prefix.len() > p.len()) {
            best = Some((prefix, category));
        }
    }
    best.map_or(UNCATEGORIZED, |(_, category)| category)
}

/// Every distinct category folder, uncategorized included
pub fn categories() -> Vec<&'static str> {
    let mut categories: Vec<&'static str> = Vec::new();
    for &(_, category) in ROUTING_TABLE {
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    categories.push(UNCATEGORIZED);
    categories
}

/// Folder of `category` under `root`
pub fn category_dir(root: &Path, category: &str) -> PathBuf {
    category.split('/').fold(root.to_path_buf(), |dir, part| dir.join(part))
}

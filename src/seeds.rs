//! Built-in item pool, used when the config file supplies no items.

use crate::domain::Item;

fn item(name: &str, category: &str, slug: &str) -> Item {
  Item {
    name: name.into(),
    category: category.into(),
    audio: format!("/sounds/{slug}.mp3"),
    image: format!("/images/{slug}.png"),
  }
}

/// Minimal gunshot pool that keeps the quiz playable without external config.
pub fn seed_pool() -> Vec<Item> {
  vec![
    item("Caldwell Conversion Pistol", "Compact", "conversion"),
    item("Nagant M1895", "Compact", "nagant"),
    item("Scottfield Model 3", "Medium", "scottfield"),
    item("Winfield M1873", "Compact", "winfield"),
    item("Springfield 1866", "Medium", "springfield"),
    item("Vetterli 71 Karabiner", "Medium", "vetterli"),
    item("Mosin-Nagant M1891", "Long", "mosin"),
    item("Lebel 1886", "Long", "lebel"),
    item("Sparks LRR", "Long", "sparks"),
    item("Martini-Henry IC1", "Long", "martini"),
    item("Romero 77", "Shotgun", "romero"),
    item("Specter 1882", "Shotgun", "specter"),
    item("Crossbow", "Special", "crossbow"),
    item("Hand Crossbow", "Special", "hand_crossbow"),
  ]
}

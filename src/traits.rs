pub trait Indexable {
  fn id(&self) -> uuid::Uuid;
}

pub fn shorten_id(id: uuid::Uuid) -> String {
  let id_string = id.as_simple().to_string();
  format!(
    "{}..{}",
    &id_string[0..4],
    &id_string[id_string.len() - 4..id_string.len()]
  )
}

/// Accepts either a full uuid or its shortened `abcd..wxyz` form.
pub fn resolve_id<T: Indexable>(items: &[T], id: &str) -> Option<uuid::Uuid> {
  if let Ok(full_id) = uuid::Uuid::parse_str(id) {
    return items.iter().map(|item| item.id()).find(|&i| i == full_id);
  }

  return items
    .iter()
    .map(|item| item.id())
    .find(|&item_id| shorten_id(item_id) == id);
}

// Accessors shared by every entity type. Each type holds `client: Client` and
// `entity: Entity` fields.
macro_rules! impl_entity {
    ($name:ident) => {
        impl $name {
            pub fn entity(&self) -> &$crate::Entity {
                &self.entity
            }

            pub fn entity_mut(&mut self) -> &mut $crate::Entity {
                &mut self.entity
            }

            pub fn into_entity(self) -> $crate::Entity {
                self.entity
            }

            pub fn client(&self) -> &$crate::Client {
                &self.client
            }

            pub fn auth(&self) -> &$crate::Auth {
                self.entity.auth()
            }

            /// Shorthand for `entity().get(path)`
            pub fn get(&self, path: &str) -> Option<&serde_json::Value> {
                self.entity.get(path)
            }
        }

        impl AsRef<$crate::Entity> for $name {
            fn as_ref(&self) -> &$crate::Entity {
                &self.entity
            }
        }
    };
}

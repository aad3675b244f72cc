//! Shared aliases and strongly-typed common values for the relay crates.
//!
//! ```rust
//! use athena_common::{MetadataMap, ProviderId, SamplingOptions, SessionId};
//!
//! let session = SessionId::from("session-1");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("tenant".to_string(), "acme".to_string());
//!
//! let options = SamplingOptions::default().with_temperature(0.3);
//! assert_eq!(session.as_str(), "session-1");
//! assert_eq!(ProviderId::OpenAi.to_string(), "openai");
//! assert!(!options.stream);
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use athena_common::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Shared metadata map and identifier newtypes.

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct SessionId(String);

    impl SessionId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for SessionId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for SessionId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for SessionId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod provider {
    //! Provider identity shared by adapters and upstream clients.

    use std::fmt::{Display, Formatter};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ProviderId {
        OpenAi,
        Anthropic,
    }

    impl ProviderId {
        /// Parses the wire-level provider name used by chat requests.
        pub fn from_name(name: &str) -> Option<Self> {
            match name {
                "openai" => Some(Self::OpenAi),
                "anthropic" => Some(Self::Anthropic),
                _ => None,
            }
        }
    }

    impl Display for ProviderId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            let id = match self {
                Self::OpenAi => "openai",
                Self::Anthropic => "anthropic",
            };

            f.write_str(id)
        }
    }
}

pub mod model {
    //! Shared generation settings used by chat request types.

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct SamplingOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
        pub top_p: Option<f32>,
        pub stream: bool,
    }

    impl SamplingOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }

        pub fn with_top_p(mut self, top_p: f32) -> Self {
            self.top_p = Some(top_p);
            self
        }

        pub fn enable_streaming(mut self) -> Self {
            self.stream = true;
            self
        }
    }
}

pub mod registry {
    //! Insertion-ordered registry map used by the tool and adapter catalogs.
    //!
    //! Enumeration order is registration order, which keeps catalog listings
    //! deterministic within a process run. Inserting an occupied key is
    //! rejected and leaves the registry untouched.
    //!
    //! ```rust
    //! use athena_common::OrderedRegistry;
    //!
    //! let mut registry = OrderedRegistry::new();
    //! registry.try_insert("beta".to_string(), 2_u32).expect("first insert");
    //! registry.try_insert("alpha".to_string(), 1_u32).expect("second insert");
    //!
    //! let names: Vec<_> = registry.keys().cloned().collect();
    //! assert_eq!(names, vec!["beta".to_string(), "alpha".to_string()]);
    //! assert!(registry.try_insert("beta".to_string(), 3).is_err());
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct OrderedRegistry<K, V> {
        order: Vec<K>,
        items: HashMap<K, V>,
    }

    impl<K, V> Default for OrderedRegistry<K, V>
    where
        K: Eq + Hash + Clone,
    {
        fn default() -> Self {
            Self {
                order: Vec::new(),
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> OrderedRegistry<K, V>
    where
        K: Eq + Hash + Clone,
    {
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts the pair, or returns it unchanged when the key is taken.
        pub fn try_insert(&mut self, key: K, value: V) -> Result<(), (K, V)> {
            if self.items.contains_key(&key) {
                return Err((key, value));
            }

            self.order.push(key.clone());
            self.items.insert(key, value);
            Ok(())
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            let removed = self.items.remove(key)?;
            self.order.retain(|existing| existing.borrow() != key);
            Some(removed)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        /// Keys in registration order.
        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.order.iter()
        }

        /// Values in registration order.
        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.order.iter().filter_map(|key| self.items.get(key))
        }

        pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
            self.order
                .iter()
                .filter_map(|key| self.items.get(key).map(|value| (key, value)))
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }

        pub fn clear(&mut self) {
            self.order.clear();
            self.items.clear();
        }
    }
}

pub use context::{MetadataMap, SessionId};
pub use future::BoxFuture;
pub use model::SamplingOptions;
pub use provider::ProviderId;
pub use registry::OrderedRegistry;

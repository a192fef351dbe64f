use crate::assets::AssetJoin;
use crate::{
    Actor, AssetResolver, AtlasResolution, AtlasSource, Error, NestedActorAsset,
    NestedActorResolution,
};

/// Physical encoding of an actor file.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum Encoding {
    /// Binary when the input starts with the `NIMA` magic, JSON otherwise.
    #[default]
    Auto,
    Binary,
    Json,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default, rename_all = "camelCase"))]
pub struct LoaderConfig {
    pub encoding: Encoding,
    /// Hand nested actor assets to the resolver. When off they stay unresolved.
    pub load_nested_actors: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::Auto,
            load_nested_actors: true,
        }
    }
}

impl LoaderConfig {
    #[cfg(feature = "json")]
    pub fn from_json_str(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })
    }
}

/// Decodes actor files and drives their external assets to completion.
pub struct ActorLoader<R> {
    config: LoaderConfig,
    resolver: R,
}

impl<R: AssetResolver> ActorLoader<R> {
    pub fn new(resolver: R) -> Self {
        Self::with_config(LoaderConfig::default(), resolver)
    }

    pub fn with_config(config: LoaderConfig, resolver: R) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Actor, Error> {
        match self.config.encoding {
            Encoding::Auto => Actor::from_bytes(bytes),
            #[cfg(feature = "binary")]
            Encoding::Binary => Actor::from_binary(bytes),
            #[cfg(feature = "json")]
            Encoding::Json => Actor::from_json_slice(bytes),
            #[allow(unreachable_patterns)]
            _ => Err(Error::UnsupportedEncoding),
        }
    }

    /// Decodes `bytes`, then hands every atlas and nested actor asset to the resolver.
    /// `on_complete` receives the actor once the last of them resolves, possibly before
    /// this call returns.
    ///
    /// Only an unreadable header is reported here; malformed records inside the file
    /// end up in [`Actor::error`].
    pub fn load(
        &self,
        bytes: &[u8],
        on_complete: impl FnOnce(Actor) + Send + 'static,
    ) -> Result<(), Error> {
        let mut actor = self.decode(bytes)?;

        let atlases: Vec<(usize, AtlasSource)> = actor
            .atlases
            .iter_mut()
            .enumerate()
            .filter_map(|(index, atlas)| atlas.source.take().map(|source| (index, source)))
            .collect();
        let nested: Vec<(usize, NestedActorAsset)> = if self.config.load_nested_actors {
            actor
                .nested_actor_assets
                .iter()
                .map(|asset| NestedActorAsset {
                    name: asset.name.clone(),
                    id: asset.id.clone(),
                    actor: None,
                })
                .enumerate()
                .collect()
        } else {
            Vec::new()
        };

        let outstanding = atlases.len() + nested.len();
        log::debug!(
            "actor decoded, resolving {} atlases and {} nested actors",
            atlases.len(),
            nested.len()
        );
        let join = AssetJoin::start(actor, outstanding, Box::new(on_complete));
        for (index, source) in atlases {
            self.resolver
                .resolve_atlas(index, source, AtlasResolution::new(join.clone(), index));
        }
        for (index, asset) in nested {
            self.resolver
                .resolve_nested_actor(&asset, NestedActorResolution::new(join.clone(), index));
        }
        Ok(())
    }
}

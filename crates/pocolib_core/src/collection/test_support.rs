//! Entity type used by the collection tests.

use crate::codec::{join_fields, pad_field, split_fields, LineCodec};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Note {
    pub id: u64,
    pub text: String,
}

impl Note {
    pub fn new(id: u64, text: &str) -> Self {
        Self {
            id,
            text: text.to_string(),
        }
    }
}

impl LineCodec for Note {
    const KIND: &'static str = "note";
    type Key = u64;
    type Context<'a> = ();

    fn key(&self) -> u64 {
        self.id
    }

    fn encode(&self) -> String {
        join_fields([self.id.to_string(), self.text.clone()])
    }

    fn decode(line: &str, _ctx: &()) -> CoreResult<Self> {
        let fields = split_fields(Self::KIND, line, 2)?;
        let id = fields[0]
            .parse()
            .map_err(|_| CoreError::malformed(Self::KIND, format!("bad id {:?}", fields[0])))?;
        Ok(Self::new(id, fields[1]))
    }

    fn searchable_projection(&self) -> String {
        pad_field(&self.id.to_string()) + &pad_field(&self.text)
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub selected: bool,
}

/// Stored form: older sessions saved bare names, newer ones save choices.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum StoredParticipant {
    Name(String),
    Choice(Participant),
}

/// The participant list returned at upload, narrowed by the user.
///
/// Names are distinct and keep upload order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<StoredParticipant>", into = "Vec<Participant>")]
pub struct Selection {
    participants: Vec<Participant>,
}

impl Selection {
    /// Every participant starts selected.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::default();
        for name in names {
            selection.push(Participant {
                name: name.into(),
                selected: true,
            });
        }
        selection
    }

    fn push(&mut self, participant: Participant) {
        if !self.participants.iter().any(|p| p.name == participant.name) {
            self.participants.push(participant);
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.participants.iter().filter(|p| p.selected).count()
    }

    pub fn all_selected(&self) -> bool {
        self.selected_count() == self.participants.len()
    }

    /// Flips one participant. Returns false when the name is unknown.
    pub fn toggle(&mut self, name: &str) -> bool {
        match self.participants.iter_mut().find(|p| p.name == name) {
            Some(participant) => {
                participant.selected = !participant.selected;
                true
            }
            None => false,
        }
    }

    pub fn set_selected(&mut self, name: &str, selected: bool) -> bool {
        match self.participants.iter_mut().find(|p| p.name == name) {
            Some(participant) => {
                participant.selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn set_all(&mut self, selected: bool) {
        for participant in &mut self.participants {
            participant.selected = selected;
        }
    }

    /// Selects everyone unless everyone is already selected.
    pub fn toggle_all(&mut self) {
        let select = !self.all_selected();
        self.set_all(select);
    }

    pub fn selected(&self) -> Vec<String> {
        self.participants
            .iter()
            .filter(|p| p.selected)
            .map(|p| p.name.clone())
            .collect()
    }
}

impl From<Vec<StoredParticipant>> for Selection {
    fn from(stored: Vec<StoredParticipant>) -> Self {
        let mut selection = Self::default();
        for item in stored {
            selection.push(match item {
                StoredParticipant::Name(name) => Participant {
                    name,
                    selected: true,
                },
                StoredParticipant::Choice(participant) => participant,
            });
        }
        selection
    }
}

impl From<Selection> for Vec<Participant> {
    fn from(selection: Selection) -> Self {
        selection.participants
    }
}

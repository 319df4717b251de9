mod achievement;
mod example;
mod ids;
mod progress;
mod question;
mod topic;
mod web_question;

pub use achievement::Achievement;
pub use example::{CodeAnnotation, CodeExample};
pub use ids::{ExampleId, QuestionId, SectionId, TopicId};
pub use progress::{LearningProgress, TopicProgress};
pub use question::{Difficulty, Question, QuestionType};
pub use topic::{Topic, TopicSection};
pub use web_question::WebQuestion;
